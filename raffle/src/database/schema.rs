//! SQL table definitions and shared statements.

/// Current schema version, stored in the `metadata` table.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Key-value store for schema version and similar bookkeeping.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// Orders. Codes are unique across events.
pub const CREATE_ORDERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS orders (
        code TEXT PRIMARY KEY NOT NULL,
        event TEXT NOT NULL,
        status TEXT NOT NULL,
        require_approval INTEGER NOT NULL DEFAULT 0
    )";

/// Line items of orders, in insertion order.
pub const CREATE_POSITIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS positions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_code TEXT NOT NULL REFERENCES orders(code) ON DELETE CASCADE,
        subevent INTEGER,
        admission INTEGER NOT NULL DEFAULT 1,
        canceled INTEGER NOT NULL DEFAULT 0
    )";

/// Cliques. Names are unique per event.
pub const CREATE_CLIQUES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS cliques (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event TEXT NOT NULL,
        name TEXT NOT NULL,
        password TEXT,
        UNIQUE (event, name)
    )";

/// At most one clique per order.
pub const CREATE_ORDER_CLIQUES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS order_cliques (
        order_code TEXT PRIMARY KEY NOT NULL REFERENCES orders(code) ON DELETE CASCADE,
        clique_id INTEGER NOT NULL REFERENCES cliques(id) ON DELETE CASCADE,
        is_admin INTEGER NOT NULL DEFAULT 0
    )";

/// At most one override per order.
pub const CREATE_OVERRIDES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS raffle_overrides (
        order_code TEXT PRIMARY KEY NOT NULL REFERENCES orders(code) ON DELETE CASCADE,
        mode TEXT NOT NULL
    )";

/// Optional ticket quotas per occurrence. `subevent` is NULL for
/// single-occurrence events.
pub const CREATE_QUOTAS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS quotas (
        event TEXT NOT NULL,
        subevent INTEGER,
        size INTEGER NOT NULL
    )";

/// Audit trail.
pub const CREATE_LOG_ENTRIES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS log_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_code TEXT NOT NULL,
        action TEXT NOT NULL,
        data TEXT NOT NULL,
        user_id INTEGER,
        created_at TEXT NOT NULL
    )";

/// One row per running job. `scope` is `<event>/<subevent or ->`.
pub const CREATE_RUN_LOCKS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS run_locks (
        scope TEXT PRIMARY KEY NOT NULL,
        acquired_at TEXT NOT NULL
    )";

/// Speeds up snapshot loading.
pub const CREATE_ORDERS_EVENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_orders_event ON orders(event)";

/// Speeds up position lookups per order.
pub const CREATE_POSITIONS_ORDER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_positions_order ON positions(order_code)";

/// Speeds up audit queries per order.
pub const CREATE_LOG_ORDER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_log_entries_order ON log_entries(order_code)";

/// Reads the schema version.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// Writes the schema version.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

/// Appends an audit entry.
pub const INSERT_LOG_ENTRY: &str = r"
    INSERT INTO log_entries (order_code, action, data, user_id, created_at)
    VALUES (?, ?, ?, ?, ?)
";

/// Reads one order's header.
pub const SELECT_ORDER: &str =
    "SELECT code, event, status, require_approval FROM orders WHERE code = ?";

/// Reads an order's line items.
pub const SELECT_POSITIONS: &str = r"
    SELECT subevent, admission, canceled FROM positions
    WHERE order_code = ?
    ORDER BY id
";
