// src/billing.rs
//! Plans, hosted checkout and subscription management
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::ApiClient;
use crate::notify::Notifier;
use crate::routes::Route;

pub const DEFAULT_CHECKOUT_BASE_URL: &str = "https://checkout.stripe.com/c/pay";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub price_cents: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
}

fn default_currency() -> String {
    "usd".to_string()
}

impl Plan {
    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }

    /// "USD 12.00/month", "USD 5.00" for one-off packs, "Free"
    pub fn price_label(&self) -> String {
        if self.is_free() {
            return "Free".to_string();
        }
        let amount = format!(
            "{} {}.{:02}",
            self.currency.to_uppercase(),
            self.price_cents / 100,
            self.price_cents % 100
        );
        match self.interval.as_deref() {
            Some(interval) if !interval.is_empty() => format!("{}/{}", amount, interval),
            _ => amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutState {
    Paid,
    Open,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutVerification {
    pub status: CheckoutState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_added: Option<u32>,
}

impl CheckoutVerification {
    /// Where the dashboard lands after returning from the provider
    pub fn landing_route(&self) -> Route {
        match self.status {
            CheckoutState::Paid => Route::BillingSuccess,
            _ => Route::BillingCancel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan_id: String,
    #[serde(default)]
    pub plan_name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credits {
    pub balance: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<u32>,
    #[serde(default)]
    pub used_this_month: u32,
}

impl Credits {
    pub fn monthly_remaining(&self) -> Option<u32> {
        self.monthly_limit
            .map(|limit| limit.saturating_sub(self.used_this_month))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    plan_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct PortalSession {
    url: String,
}

/// Provider page for a checkout session. The server-supplied url wins.
pub fn checkout_redirect_url(session: &CheckoutSession, base_url: Option<&str>) -> String {
    if let Some(url) = session.url.as_deref().filter(|u| !u.trim().is_empty()) {
        return url.to_string();
    }
    let base = base_url.unwrap_or(DEFAULT_CHECKOUT_BASE_URL);
    format!("{}/{}", base.trim_end_matches('/'), session.session_id)
}

pub struct BillingService {
    client: Arc<ApiClient>,
    notifier: Arc<Notifier>,
    checkout_base_url: Option<String>,
}

impl BillingService {
    pub fn new(
        client: Arc<ApiClient>,
        notifier: Arc<Notifier>,
        checkout_base_url: Option<String>,
    ) -> Self {
        Self {
            client,
            notifier,
            checkout_base_url,
        }
    }

    pub async fn plans(&self) -> Result<Vec<Plan>> {
        let result = self.client.get("/billing/plans").await;
        self.notifier.report("Failed to load plans", result)
    }

    /// Start a hosted checkout and return the session plus the page to open
    pub async fn create_checkout(&self, plan_id: &str) -> Result<(CheckoutSession, String)> {
        let request = CheckoutRequest { plan_id };
        let result = self.client.post_json("/billing/checkout", &request).await;
        let session: CheckoutSession = self.notifier.report("Failed to start checkout", result)?;
        let url = checkout_redirect_url(&session, self.checkout_base_url.as_deref());
        info!("Checkout session {} created for plan {}", session.session_id, plan_id);
        Ok((session, url))
    }

    pub async fn verify_checkout(&self, session_id: &str) -> Result<CheckoutVerification> {
        let result = self
            .client
            .get(&format!("/billing/checkout/{}", session_id))
            .await;
        let verification: CheckoutVerification =
            self.notifier.report("Failed to verify payment", result)?;
        match verification.status {
            CheckoutState::Paid => self.notifier.success("Payment confirmed"),
            CheckoutState::Open => self.notifier.info("Payment not completed yet"),
            _ => self.notifier.info("Checkout was not completed"),
        }
        Ok(verification)
    }

    pub async fn subscription(&self) -> Result<Option<Subscription>> {
        let result = self.client.get("/billing/subscription").await;
        self.notifier.report("Failed to load subscription", result)
    }

    pub async fn cancel_subscription(&self) -> Result<Subscription> {
        let result = self
            .client
            .post_empty("/billing/subscription/cancel")
            .await;
        let subscription: Subscription =
            self.notifier.report("Failed to cancel subscription", result)?;
        self.notifier
            .success("Subscription will end at the close of the billing period");
        Ok(subscription)
    }

    /// Customer portal link for managing payment methods and invoices
    pub async fn portal_url(&self) -> Result<String> {
        let result: Result<PortalSession> = self.client.post_empty("/billing/portal").await;
        let portal = self.notifier.report("Failed to open billing portal", result)?;
        Ok(portal.url)
    }

    pub async fn credits(&self) -> Result<Credits> {
        let result = self.client.get("/billing/credits").await;
        self.notifier.report("Failed to load credits", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastLevel;
    use crate::test_support::{signed_in_client, spawn_server};
    use axum::{
        extract::Path,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    #[test]
    fn test_redirect_url_prefers_server_url() {
        let with_url = CheckoutSession {
            session_id: "cs_1".into(),
            url: Some("https://pay.example.com/cs_1".into()),
        };
        assert_eq!(
            checkout_redirect_url(&with_url, None),
            "https://pay.example.com/cs_1"
        );

        let bare = CheckoutSession {
            session_id: "cs_2".into(),
            url: None,
        };
        assert_eq!(
            checkout_redirect_url(&bare, None),
            "https://checkout.stripe.com/c/pay/cs_2"
        );
        assert_eq!(
            checkout_redirect_url(&bare, Some("http://localhost:9000/pay/")),
            "http://localhost:9000/pay/cs_2"
        );
    }

    #[test]
    fn test_price_label() {
        let plan: Plan = serde_json::from_value(json!({
            "id": "pro", "name": "Pro", "priceCents": 1250, "interval": "month"
        }))
        .unwrap();
        assert_eq!(plan.price_label(), "USD 12.50/month");

        let free: Plan =
            serde_json::from_value(json!({"id": "free", "name": "Free", "priceCents": 0})).unwrap();
        assert_eq!(free.price_label(), "Free");
    }

    #[tokio::test]
    async fn test_checkout_flow() {
        let router = Router::new()
            .route(
                "/billing/checkout",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["planId"], "pro");
                    Json(json!({"sessionId": "cs_42"}))
                }),
            )
            .route(
                "/billing/checkout/:id",
                get(|Path(id): Path<String>| async move {
                    let status = if id == "cs_42" { "paid" } else { "canceled" };
                    Json(json!({"status": status, "planId": "pro"}))
                }),
            );
        let base = spawn_server(router).await;
        let notifier = Arc::new(Notifier::new());
        let billing = BillingService::new(signed_in_client(&base), notifier.clone(), None);

        let (session, url) = billing.create_checkout("pro").await.unwrap();
        assert_eq!(url, "https://checkout.stripe.com/c/pay/cs_42");

        let verified = billing.verify_checkout(&session.session_id).await.unwrap();
        assert_eq!(verified.landing_route(), Route::BillingSuccess);
        assert_eq!(notifier.last().unwrap().level, ToastLevel::Success);

        let other = billing.verify_checkout("cs_0").await.unwrap();
        assert_eq!(other.status, CheckoutState::Unknown);
        assert_eq!(other.landing_route(), Route::BillingCancel);
    }

    #[tokio::test]
    async fn test_no_subscription_and_credits() {
        let router = Router::new()
            .route("/billing/subscription", get(|| async { Json(Value::Null) }))
            .route(
                "/billing/credits",
                get(|| async {
                    Json(json!({"balance": 3, "monthlyLimit": 10, "usedThisMonth": 12}))
                }),
            );
        let base = spawn_server(router).await;
        let billing = BillingService::new(signed_in_client(&base), Arc::new(Notifier::new()), None);

        assert_eq!(billing.subscription().await.unwrap(), None);
        let credits = billing.credits().await.unwrap();
        assert_eq!(credits.balance, 3);
        assert_eq!(credits.monthly_remaining(), Some(0));
    }
}
