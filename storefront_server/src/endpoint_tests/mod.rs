mod admin;
mod helpers;
mod mocks;
mod orders;
