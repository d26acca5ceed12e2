mod staff;

pub use staff::{StaffTokenMiddlewareFactory, StaffTokenMiddlewareService, STAFF_TOKEN_HEADER};
