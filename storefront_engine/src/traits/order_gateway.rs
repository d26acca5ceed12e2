use crate::{
    order_objects::{OrderCreated, OrderRequest},
    sf_api::errors::OrderApiError,
};

/// Where checkout sends finished order requests. In-process this is the [`crate::OrderFlowApi`]; a remote client
/// would implement it with an HTTP call to `POST /api/orders`.
#[allow(async_fn_in_trait)]
pub trait OrderGateway {
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderCreated, OrderApiError>;
}

/// Opens the chat deep link for the chat-handoff checkout. Opening the link is the success criterion of that channel.
pub trait ChatLauncher {
    fn open_chat(&self, link: &str) -> Result<(), String>;
}
