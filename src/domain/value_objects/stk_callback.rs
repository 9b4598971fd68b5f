use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Daraja STK push result notification. The envelope nests the interesting
/// fields two levels deep and reports payment details as a name/value item
/// list in no guaranteed order.
#[derive(Debug, Clone, Deserialize)]
pub struct StkCallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkCallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    #[serde(rename = "CallbackMetadata")]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item")]
    pub item: Vec<CallbackItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: Option<Value>,
}

/// Payment details extracted from a successful callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub receipt_number: String,
    pub paid_at: DateTime<Utc>,
    pub phone_number: String,
}

const TRANSACTION_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

impl CallbackMetadata {
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.item
            .iter()
            .find(|item| item.name == name)
            .and_then(|item| item.value.as_ref())
    }

    fn required_text(&self, name: &str) -> Result<String> {
        let value = self
            .value(name)
            .ok_or_else(|| anyhow!("callback metadata item {name} is missing"))?;
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(anyhow!("callback metadata item {name} has unexpected type: {other}")),
        }
    }
}

impl StkCallback {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// Pulls the provider-issued proof of payment out of the metadata list.
    /// Unknown extra items are ignored; a missing required item is an error.
    pub fn receipt(&self) -> Result<PaymentReceipt> {
        let metadata = self
            .callback_metadata
            .as_ref()
            .ok_or_else(|| anyhow!("success callback has no CallbackMetadata"))?;

        let receipt_number = metadata.required_text("MpesaReceiptNumber")?;
        let transaction_date = metadata.required_text("TransactionDate")?;
        let phone_number = metadata.required_text("PhoneNumber")?;

        // Daraja timestamps carry no zone marker; taken as UTC.
        let paid_at = NaiveDateTime::parse_from_str(&transaction_date, TRANSACTION_DATE_FORMAT)
            .map_err(|err| anyhow!("TransactionDate {transaction_date} is malformed: {err}"))?
            .and_utc();

        Ok(PaymentReceipt {
            receipt_number,
            paid_at,
            phone_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn success_payload() -> Value {
        json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            { "Name": "Amount", "Value": 1200.0 },
                            { "Name": "MpesaReceiptNumber", "Value": "QAX123" },
                            { "Name": "TransactionDate", "Value": 20250116103000u64 },
                            { "Name": "PhoneNumber", "Value": 254712345678u64 }
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn parses_success_envelope_and_receipt() {
        let envelope: StkCallbackEnvelope =
            serde_json::from_value(success_payload()).unwrap();
        let callback = envelope.body.stk_callback;

        assert!(callback.is_success());
        assert_eq!(callback.checkout_request_id, "ws_CO_191220191020363925");

        let receipt = callback.receipt().unwrap();
        assert_eq!(receipt.receipt_number, "QAX123");
        assert_eq!(receipt.phone_number, "254712345678");
        assert_eq!(
            receipt.paid_at,
            Utc.with_ymd_and_hms(2025, 1, 16, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn metadata_lookup_is_order_independent() {
        let mut payload = success_payload();
        let items = payload["Body"]["stkCallback"]["CallbackMetadata"]["Item"]
            .as_array_mut()
            .unwrap();
        items.reverse();

        let envelope: StkCallbackEnvelope = serde_json::from_value(payload).unwrap();
        let receipt = envelope.body.stk_callback.receipt().unwrap();
        assert_eq!(receipt.receipt_number, "QAX123");
    }

    #[test]
    fn tolerates_unknown_metadata_items() {
        let mut payload = success_payload();
        payload["Body"]["stkCallback"]["CallbackMetadata"]["Item"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "Name": "Balance", "Value": "500.00" }));

        let envelope: StkCallbackEnvelope = serde_json::from_value(payload).unwrap();
        assert!(envelope.body.stk_callback.receipt().is_ok());
    }

    #[test]
    fn missing_receipt_number_is_an_error() {
        let mut payload = success_payload();
        payload["Body"]["stkCallback"]["CallbackMetadata"]["Item"]
            .as_array_mut()
            .unwrap()
            .retain(|item| item["Name"] != "MpesaReceiptNumber");

        let envelope: StkCallbackEnvelope = serde_json::from_value(payload).unwrap();
        let err = envelope.body.stk_callback.receipt().unwrap_err();
        assert!(err.to_string().contains("MpesaReceiptNumber"));
    }

    #[test]
    fn failure_callback_has_no_metadata() {
        let payload = json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 1032,
                    "ResultDesc": "Request cancelled by user"
                }
            }
        });

        let envelope: StkCallbackEnvelope = serde_json::from_value(payload).unwrap();
        let callback = envelope.body.stk_callback;
        assert!(!callback.is_success());
        assert!(callback.receipt().is_err());
    }

    #[test]
    fn malformed_transaction_date_is_an_error() {
        let mut payload = success_payload();
        payload["Body"]["stkCallback"]["CallbackMetadata"]["Item"]
            .as_array_mut()
            .unwrap()
            .iter_mut()
            .for_each(|item| {
                if item["Name"] == "TransactionDate" {
                    item["Value"] = json!("16-01-2025");
                }
            });

        let envelope: StkCallbackEnvelope = serde_json::from_value(payload).unwrap();
        assert!(envelope.body.stk_callback.receipt().is_err());
    }
}
