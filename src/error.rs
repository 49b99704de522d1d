#[derive(thiserror::Error, Debug)]
pub enum ReceptionError {
    #[error("transfer item {0} has no corresponding form entry")]
    MissingFormItem(String),
    #[error("transfer item {0} has no received quantity entered")]
    QuantityMissing(String),
    #[error("short receipt on transfer item {0} lacks a discrepancy reason")]
    MissingDiscrepancyReason(String),
    #[error("no reception item matches transfer item {0}")]
    MissingReceptionItem(String),
    #[error("reception response is missing required field `{0}`")]
    MalformedResponse(&'static str),
    #[error("unknown reception status `{0}`")]
    UnknownStatus(String),
}
