use serde::Serialize;

/// What kind of lookup a search string refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryKind {
    /// Transaction hash (0x + 64 hex chars)
    #[serde(rename = "tx")]
    Transaction,
    /// Account or contract address (0x + 40 hex chars)
    #[serde(rename = "address")]
    Address,
    /// Decimal block number
    #[serde(rename = "block")]
    Block,
    /// Nothing we know how to look up
    #[serde(rename = "unknown")]
    Unknown,
}

/// Length of `0x` + 40 hex digits
const ADDRESS_LEN: usize = 42;
/// Length of `0x` + 64 hex digits
const TX_HASH_LEN: usize = 66;

/// Classify a raw search string.
///
/// Runs on every keystroke, so it is a single pass over the input with no
/// allocation. Checksums are not verified and decimal strings are not
/// range-checked: `"99999999999999999999999"` is a [`QueryKind::Block`] and
/// fails later when the block number is parsed for the lookup.
pub fn classify(raw: &str) -> QueryKind {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return QueryKind::Unknown;
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return QueryKind::Block;
    }

    if is_prefixed_hex(trimmed) {
        return match trimmed.len() {
            ADDRESS_LEN => QueryKind::Address,
            TX_HASH_LEN => QueryKind::Transaction,
            _ => QueryKind::Unknown,
        };
    }

    QueryKind::Unknown
}

/// `0x` followed by at least one hex digit and nothing else
fn is_prefixed_hex(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Strict address check: `0x` followed by exactly 40 hex digits, no trimming
pub fn is_hex_address(s: &str) -> bool {
    s.len() == ADDRESS_LEN && is_prefixed_hex(s)
}

impl QueryKind {
    /// The result view that displays this kind, if any
    pub fn view(self) -> Option<ExplorerView> {
        match self {
            Self::Transaction => Some(ExplorerView::Transaction),
            Self::Address => Some(ExplorerView::Address),
            Self::Block => Some(ExplorerView::Block),
            Self::Unknown => None,
        }
    }

    /// Guidance text shown under the search box
    pub fn hint(self) -> &'static str {
        match self {
            Self::Transaction => "Detected: transaction hash",
            Self::Address => "Detected: address",
            Self::Block => "Detected: block number",
            Self::Unknown => "Unrecognized input: check the format",
        }
    }

    /// Short label, matches the wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transaction => "tx",
            Self::Address => "address",
            Self::Block => "block",
            Self::Unknown => "unknown",
        }
    }
}

/// Hint for a raw query, including the empty-input case
pub fn hint_for(raw: &str) -> &'static str {
    if raw.trim().is_empty() {
        return "Supports: tx hash / address / block number (auto-detected)";
    }
    classify(raw).hint()
}

/// Result tab a front end shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplorerView {
    #[default]
    #[serde(rename = "tx")]
    Transaction,
    Address,
    Block,
}

/// Derived explorer state: the active view and the address history page.
///
/// Independent of any UI toolkit; a front end feeds it every input change
/// through [`ViewState::observe`] and renders from its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub view: ExplorerView,
    pub history_page: u64,
    /// Lowercased address currently shown in the history view
    address: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            view: ExplorerView::default(),
            history_page: 1,
            address: None,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-classify after an input change and apply the transition rule.
    ///
    /// A concrete kind selects its view; `Unknown` leaves the view as is.
    /// The history page goes back to 1 whenever the observed address changes.
    pub fn observe(&mut self, raw: &str) -> QueryKind {
        let kind = classify(raw);

        if let Some(view) = kind.view() {
            self.view = view;
        }

        let address = (kind == QueryKind::Address).then(|| raw.trim().to_lowercase());
        if address != self.address {
            self.address = address;
            self.history_page = 1;
        }

        kind
    }

    /// Explicit tab selection by the user
    pub fn select(&mut self, view: ExplorerView) {
        self.view = view;
    }

    /// Advance only if the last page came back full
    pub fn next_page(&mut self, items_on_page: usize, page_size: u64) -> bool {
        if (items_on_page as u64) < page_size {
            return false;
        }
        self.history_page += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.history_page <= 1 {
            return false;
        }
        self.history_page -= 1;
        true
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}
