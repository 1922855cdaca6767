use alloy::primitives::Address;
use bigdecimal::BigDecimal;

pub const CONTRACT_CREATION_MARKER: &str = "[CONTRACT CREATION]";

/// Receipt status as shown on transaction pages.
///
/// # Examples
/// ```
/// use rs_block_explorer::utils::format::receipt_status_label;
///
/// assert_eq!(receipt_status_label(true), "SUCCESSFUL");
/// assert_eq!(receipt_status_label(false), "FAILED");
/// ```
pub fn receipt_status_label(success: bool) -> &'static str {
    if success { "SUCCESSFUL" } else { "FAILED" }
}

/// Recipient column for a transaction without `to`: the created contract plus a marker.
pub fn contract_creation_label(created: Option<Address>) -> String {
    match created {
        Some(address) => format!("{address} {CONTRACT_CREATION_MARKER}"),
        None => CONTRACT_CREATION_MARKER.to_string(),
    }
}

/// Call data as bare lowercase hex.
pub fn hex_data(data: &[u8]) -> String {
    alloy::primitives::hex::encode(data)
}

pub fn format_ether(amount: &BigDecimal) -> String {
    format!("{} ETH", amount.to_plain_string())
}
