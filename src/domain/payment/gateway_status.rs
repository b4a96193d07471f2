//! Mercado Pago payment statuses and their internal meaning.

use serde::{Deserialize, Serialize};

use super::PaymentStatus;

/// Status string reported by the gateway for a payment.
///
/// See <https://www.mercadopago.com.br/developers/en/reference/payments/_payments_id/get>.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    Pending,
    InProcess,
    InMediation,
    Authorized,
    Approved,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
    /// Anything the gateway may add later. Never changes internal state.
    #[serde(untagged)]
    Unknown(String),
}

impl GatewayStatus {
    /// Parses a raw status, case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => GatewayStatus::Pending,
            "in_process" => GatewayStatus::InProcess,
            "in_mediation" => GatewayStatus::InMediation,
            "authorized" => GatewayStatus::Authorized,
            "approved" => GatewayStatus::Approved,
            "rejected" => GatewayStatus::Rejected,
            "cancelled" => GatewayStatus::Cancelled,
            "refunded" => GatewayStatus::Refunded,
            "charged_back" => GatewayStatus::ChargedBack,
            _ => GatewayStatus::Unknown(raw.to_string()),
        }
    }

    /// Internal status this gateway status maps to. `None` for unknown values.
    pub fn to_payment_status(&self) -> Option<PaymentStatus> {
        match self {
            GatewayStatus::Pending
            | GatewayStatus::InProcess
            | GatewayStatus::InMediation
            | GatewayStatus::Authorized => Some(PaymentStatus::Pending),
            GatewayStatus::Approved => Some(PaymentStatus::Approved),
            GatewayStatus::Rejected => Some(PaymentStatus::Failed),
            GatewayStatus::Cancelled => Some(PaymentStatus::Cancelled),
            GatewayStatus::Refunded | GatewayStatus::ChargedBack => Some(PaymentStatus::Refunded),
            GatewayStatus::Unknown(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn maps_processing_statuses_to_pending() {
        for raw in ["pending", "in_process", "in_mediation", "authorized"] {
            assert_eq!(
                GatewayStatus::parse(raw).to_payment_status(),
                Some(PaymentStatus::Pending),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn maps_terminal_statuses() {
        assert_eq!(
            GatewayStatus::parse("approved").to_payment_status(),
            Some(PaymentStatus::Approved)
        );
        assert_eq!(
            GatewayStatus::parse("rejected").to_payment_status(),
            Some(PaymentStatus::Failed)
        );
        assert_eq!(
            GatewayStatus::parse("cancelled").to_payment_status(),
            Some(PaymentStatus::Cancelled)
        );
        assert_eq!(
            GatewayStatus::parse("refunded").to_payment_status(),
            Some(PaymentStatus::Refunded)
        );
        assert_eq!(
            GatewayStatus::parse("charged_back").to_payment_status(),
            Some(PaymentStatus::Refunded)
        );
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(GatewayStatus::parse(" APPROVED "), GatewayStatus::Approved);
    }

    #[test]
    fn deserializes_known_and_unknown_values() {
        let known: GatewayStatus = serde_json::from_str("\"in_process\"").unwrap();
        assert_eq!(known, GatewayStatus::InProcess);

        let unknown: GatewayStatus = serde_json::from_str("\"partially_refunded\"").unwrap();
        assert_eq!(unknown, GatewayStatus::Unknown("partially_refunded".to_string()));
    }

    proptest! {
        #[test]
        fn unknown_strings_never_map(raw in "[a-z_]{1,20}") {
            let known = [
                "pending", "in_process", "in_mediation", "authorized", "approved",
                "rejected", "cancelled", "refunded", "charged_back",
            ];
            prop_assume!(!known.contains(&raw.as_str()));
            prop_assert_eq!(GatewayStatus::parse(&raw).to_payment_status(), None);
        }
    }
}
