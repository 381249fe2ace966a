/// Product identifiers are UUIDs assigned by the store.
///
/// On the wire they are opaque strings; callers never parse them.
pub type ProductId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
