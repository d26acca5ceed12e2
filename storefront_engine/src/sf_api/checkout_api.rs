//! # Checkout
//!
//! [`CheckoutApi`] turns a cart and a completed checkout form into an order request and sends it down one of three
//! channels:
//!
//! * **Website** (cash on delivery): the order is submitted and the cart cleared once it is stored.
//! * **WhatsApp**: the order is submitted for the shop's records, but the outcome of that call does not matter. The
//!   chat link opening is what counts; once it has, the cart is cleared. The record call gets at most
//!   [`DEFAULT_CHAT_RECORD_TIMEOUT`] before the chat opens without it.
//! * **M-Pesa**: the buyer pays into the till shown by [`CheckoutApi::payment_instructions`], then pastes the
//!   confirmation SMS. The message must pass [`parse_confirmation`] before the order is submitted as `pending`, to be
//!   verified by staff later.
//!
//! Form and message validation happen before any backend call. A failed submission leaves the cart untouched and is
//! never retried automatically.
use std::{
    fmt::Debug,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use log::*;
use tokio::time::timeout;

use crate::{
    cart::{CartStorage, CartStore},
    db_types::Shillings,
    helpers::parse_confirmation,
    order_objects::OrderRequest,
    sf_api::{
        checkout_objects::{
            build_order_request,
            chat_link,
            chat_summary,
            with_mpesa_details,
            CheckoutChannel,
            CheckoutForm,
            CheckoutOutcome,
            CheckoutQuote,
            PaymentInstructions,
        },
        errors::CheckoutError,
    },
    store_config::StoreConfig,
    traits::{CatalogManagement, ChatLauncher, OrderGateway},
};

pub const DEFAULT_CHAT_RECORD_TIMEOUT: Duration = Duration::from_secs(3);

pub struct CheckoutApi<G, C, L> {
    gateway: G,
    catalog: C,
    launcher: L,
    config: StoreConfig,
    in_flight: AtomicBool,
    chat_record_timeout: Duration,
}

impl<G, C, L> Debug for CheckoutApi<G, C, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

/// Clears the in-flight flag when the submission finishes, however it finishes.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<G, C, L> CheckoutApi<G, C, L>
where
    G: OrderGateway,
    C: CatalogManagement,
    L: ChatLauncher,
{
    pub fn new(gateway: G, catalog: C, launcher: L, config: StoreConfig) -> Self {
        Self {
            gateway,
            catalog,
            launcher,
            config,
            in_flight: AtomicBool::new(false),
            chat_record_timeout: DEFAULT_CHAT_RECORD_TIMEOUT,
        }
    }

    /// How long the WhatsApp channel waits for its record call before opening the chat anyway.
    pub fn with_chat_record_timeout(mut self, limit: Duration) -> Self {
        self.chat_record_timeout = limit;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// True while a submission is running. Checkout buttons should be disabled in this state.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn begin_submission(&self) -> Result<InFlightGuard<'_>, CheckoutError> {
        match self.in_flight.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => Ok(InFlightGuard(&self.in_flight)),
            Err(_) => {
                debug!("🛒 Ignoring a second submission while the first is still in flight");
                Err(CheckoutError::SubmissionInFlight)
            },
        }
    }

    /// The fee for the chosen delivery location, and its name for display.
    async fn delivery_location(&self, id: Option<i64>) -> Result<(Shillings, Option<String>), CheckoutError> {
        match id {
            None => Ok((Shillings::zero(), None)),
            Some(id) => {
                let location =
                    self.catalog.fetch_delivery_location(id).await?.ok_or(CheckoutError::DeliveryLocationNotFound(id))?;
                Ok((location.fee, Some(location.name)))
            },
        }
    }

    /// Brings the cart's product references up to date, so that totals use current prices. If the catalog cannot be
    /// reached, checkout carries on with the prices already in the cart.
    async fn refresh_cart<S: CartStorage>(&self, cart: &mut CartStore<S>) {
        let ids = cart.lines().iter().map(|l| l.product.id).collect::<Vec<_>>();
        match self.catalog.fetch_products_by_ids(&ids).await {
            Ok(products) => {
                let dropped = cart.refresh_products(&products);
                if dropped > 0 {
                    info!("🛒 {dropped} cart lines were removed because the products are no longer available");
                }
            },
            Err(e) => warn!("🛒 Could not refresh cart prices. Using the prices in the cart. {e}"),
        }
    }

    /// Subtotal, delivery fee and total for the cart as it stands.
    pub async fn quote<S: CartStorage>(
        &self,
        cart: &CartStore<S>,
        delivery_location_id: Option<i64>,
    ) -> Result<CheckoutQuote, CheckoutError> {
        let (fee, _) = self.delivery_location(delivery_location_id).await?;
        Ok(CheckoutQuote::new(cart.total_price(), fee, &self.config))
    }

    /// The till number and amount to pay for the mobile-money channel.
    pub async fn payment_instructions<S: CartStorage>(
        &self,
        cart: &CartStore<S>,
        delivery_location_id: Option<i64>,
    ) -> Result<PaymentInstructions, CheckoutError> {
        let quote = self.quote(cart, delivery_location_id).await?;
        Ok(PaymentInstructions { till_number: self.config.till_number.clone(), amount_due: quote.total })
    }

    /// Places the order through the chosen channel. On success the cart is cleared; on failure it is left alone.
    pub async fn checkout<S: CartStorage>(
        &self,
        cart: &mut CartStore<S>,
        form: &CheckoutForm,
        channel: CheckoutChannel,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        form.validate()?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let mpesa = match &channel {
            CheckoutChannel::Mpesa(input) => {
                Some(parse_confirmation(&input.message, input.code.as_deref(), input.phone.as_deref())?)
            },
            _ => None,
        };
        let _guard = self.begin_submission()?;
        self.refresh_cart(cart).await;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let (fee, location) = self.delivery_location(form.delivery_location_id).await?;
        let request = build_order_request(cart.lines(), form, fee, channel.channel(), &self.config);
        let outcome = match channel {
            CheckoutChannel::Website => self.submit(request).await?,
            CheckoutChannel::Mpesa(_) => {
                let request = match mpesa {
                    Some(details) => with_mpesa_details(request, details),
                    None => request,
                };
                self.submit(request).await?
            },
            CheckoutChannel::WhatsApp => self.hand_off_to_chat(request, location.as_deref()).await?,
        };
        cart.clear();
        Ok(outcome)
    }

    async fn submit(&self, request: OrderRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let channel = request.ordered_via;
        let created = self.gateway.submit_order(request).await.map_err(|e| {
            warn!("🛒 {channel} order could not be placed. {e}");
            CheckoutError::from(e)
        })?;
        info!("🛒 {channel} order {} placed", created.order_number);
        Ok(CheckoutOutcome::Placed(created))
    }

    async fn hand_off_to_chat(
        &self,
        request: OrderRequest,
        location: Option<&str>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        // Record-keeping only. The chat is opened whatever happens here, and without waiting on a slow backend.
        let order = match timeout(self.chat_record_timeout, self.gateway.submit_order(request.clone())).await {
            Ok(Ok(created)) => Some(created),
            Ok(Err(e)) => {
                warn!("🛒 Could not record the WhatsApp order. Handing over to chat anyway. {e}");
                None
            },
            Err(_) => {
                warn!(
                    "🛒 Recording the WhatsApp order took longer than {} ms. Handing over to chat without an order \
                     number.",
                    self.chat_record_timeout.as_millis()
                );
                None
            },
        };
        let text = chat_summary(&request, order.as_ref().map(|o| &o.order_number), location);
        let link = chat_link(&self.config.whatsapp_number, &text);
        self.launcher.open_chat(&link).map_err(CheckoutError::ChatUnavailable)?;
        let persisted = order.is_some();
        Ok(CheckoutOutcome::ChatHandoff { link, order, persisted })
    }
}

/// A [`ChatLauncher`] for headless use: logs the link and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChatLauncher;

impl ChatLauncher for LogChatLauncher {
    fn open_chat(&self, link: &str) -> Result<(), String> {
        info!("🛒 Chat handoff link: {link}");
        Ok(())
    }
}
