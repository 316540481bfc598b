//! Natural-language invoice extraction: the system prompt and the
//! normalisation applied to whatever JSON the model returns.

use crate::llm::{strip_code_fences, truncate_chars};
use serde::Serialize;
use serde_json::{Map, Value};

pub const MIN_PROMPT_CHARS: usize = 5;
pub const MAX_PROMPT_CHARS: usize = 500;
pub const PARSE_MAX_TOKENS: u32 = 1024;

pub const SYSTEM_PROMPT: &str = r#"You are an invoice data extractor. Parse the user's natural language request and extract invoice information. Return ONLY valid JSON with this exact structure:

{
  "client": {
    "name": "string or null",
    "email": "string or null",
    "address": "string or null"
  },
  "items": [
    {
      "description": "string",
      "quantity": number,
      "price": number
    }
  ],
  "invoice": {
    "notes": "string or null"
  }
}

Rules:
- Extract client name, email if mentioned
- Parse line items with description, quantity, and unit price
- For hourly rates like "$75/hour for 8 hours", set quantity=8 and price=75
- For total amounts like "$500 for web design", set quantity=1 and price=500
- For multiple items like "3 widgets at $25 each", set quantity=3 and price=25
- Always return valid JSON, nothing else
- If you can't parse something, use null for optional fields
- Always include at least one item"#;

const DEFAULT_DESCRIPTION: &str = "Service";
const DEFAULT_QUANTITY: f64 = 1.0;
const DEFAULT_PRICE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceClient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceNotes {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedInvoice {
    pub client: InvoiceClient,
    pub items: Vec<LineItem>,
    pub invoice: InvoiceNotes,
}

/// Why a model reply could not become an invoice. The `Display` text is
/// shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceReplyError {
    #[error("I couldn't understand that. Try: 'Invoice [name] for [amount] [service]'")]
    Unparseable,
    #[error("I couldn't identify any items. Try: 'Invoice Bob for $500 web design'")]
    NoItems,
}

/// Trimmed prompt cut to [`MAX_PROMPT_CHARS`], or `None` when it is shorter
/// than [`MIN_PROMPT_CHARS`].
pub fn sanitize_prompt(prompt: &str) -> Option<&str> {
    let trimmed = prompt.trim();
    if trimmed.chars().count() < MIN_PROMPT_CHARS {
        return None;
    }
    Some(truncate_chars(trimmed, MAX_PROMPT_CHARS))
}

fn opt_string(obj: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    match obj?.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers pass through, numeric strings are parsed, anything else
/// (including `null`, "nan" and "inf") takes the default.
fn number_or(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(default)
}

fn line_item(item: &Map<String, Value>) -> LineItem {
    let description = match item.get("description") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    };
    LineItem {
        description,
        quantity: number_or(item.get("quantity"), DEFAULT_QUANTITY),
        price: number_or(item.get("price"), DEFAULT_PRICE),
    }
}

/// Validate and normalise a parsed reply. Non-object entries in `items`
/// are dropped before the emptiness check.
pub fn normalize(value: &Value) -> Result<ParsedInvoice, InvoiceReplyError> {
    let root = value.as_object().ok_or(InvoiceReplyError::Unparseable)?;
    let items: Vec<LineItem> = match root.get("items") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(line_item)
            .collect(),
        _ => Vec::new(),
    };
    if items.is_empty() {
        return Err(InvoiceReplyError::NoItems);
    }

    let client = root.get("client").and_then(Value::as_object);
    let invoice = root.get("invoice").and_then(Value::as_object);
    Ok(ParsedInvoice {
        client: InvoiceClient {
            name: opt_string(client, "name"),
            email: opt_string(client, "email"),
            address: opt_string(client, "address"),
        },
        items,
        invoice: InvoiceNotes {
            notes: opt_string(invoice, "notes"),
        },
    })
}

/// Strip fences from the model text, parse it and normalise it.
pub fn parse_reply(text: &str) -> Result<ParsedInvoice, InvoiceReplyError> {
    let json = strip_code_fences(text);
    let value: Value = serde_json::from_str(&json).map_err(|e| {
        tracing::warn!(error = %e, reply = %text, "invoice reply is not JSON");
        InvoiceReplyError::Unparseable
    })?;
    normalize(&value)
}
