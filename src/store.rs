// DuckDB-backed item/user store
//
// One connection behind a mutex: every operation below takes the lock for
// its whole duration, so check-then-insert sequences are atomic.
// IDs come from sequences and are never reused within a database.

use crate::error::StoreError;
use crate::models::{Item, SearchFilters, User};
use duckdb::types::Value;
use duckdb::{params, params_from_iter, Connection, Row};
use std::sync::{Mutex, MutexGuard};

pub type StoreResult<T> = Result<T, StoreError>;

const SCHEMA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS item_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS user_id_seq START 1;

CREATE TABLE IF NOT EXISTS items (
    id BIGINT PRIMARY KEY,
    name VARCHAR NOT NULL,
    price DOUBLE NOT NULL,
    is_offer BOOLEAN
);

CREATE TABLE IF NOT EXISTS users (
    id BIGINT PRIMARY KEY,
    username VARCHAR NOT NULL UNIQUE,
    email VARCHAR NOT NULL UNIQUE,
    full_name VARCHAR
);
"#;

const ITEM_COLUMNS: &str = "id, name, price, is_offer";
const USER_COLUMNS: &str = "id, username, email, full_name";

pub const ITEM_NOT_FOUND: &str = "Item not found";
pub const USER_CONFLICT: &str = "Username or email already exists";

fn default_items() -> Vec<Item> {
    vec![
        Item::new("Laptop", 999.99, Some(true)),
        Item::new("Mouse", 25.50, Some(false)),
        Item::new("Keyboard", 75.00, Some(true)),
        Item::new("Monitor", 299.99, Some(false)),
        Item::new("Headphones", 149.99, Some(true)),
    ]
}

fn default_users() -> Vec<User> {
    vec![
        User::new("john_doe", "john@example.com", Some("John Doe")),
        User::new("jane_smith", "jane@example.com", Some("Jane Smith")),
        User::new("alice_wonder", "alice@example.com", Some("Alice Wonderland")),
    ]
}

fn row_to_item(row: &Row<'_>) -> duckdb::Result<Item> {
    Ok(Item {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        price: row.get(2)?,
        is_offer: row.get(3)?,
    })
}

fn row_to_user(row: &Row<'_>) -> duckdb::Result<User> {
    Ok(User {
        id: Some(row.get(0)?),
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
    })
}

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a database file and ensure the schema exists.
    /// `":memory:"` opens a private in-memory database.
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;
        tracing::info!("Opened item store at {}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Insert the dummy catalogue into whichever tables are empty.
    /// Returns the number of rows inserted. All-or-nothing: a failure
    /// leaves both tables as they were.
    pub fn seed_defaults(&self) -> StoreResult<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;

        let item_count: i64 = tx.query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))?;
        if item_count == 0 {
            for item in default_items() {
                insert_item(&tx, &item)?;
                inserted += 1;
            }
        }

        let user_count: i64 = tx.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        if user_count == 0 {
            for user in default_users() {
                insert_user(&tx, &user)?;
                inserted += 1;
            }
        }

        tx.commit()?;
        if inserted > 0 {
            tracing::info!("Seeded {} default rows", inserted);
        }
        Ok(inserted)
    }

    pub fn list_items(&self) -> StoreResult<Vec<Item>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM items ORDER BY id", ITEM_COLUMNS))?;
        let items = stmt.query_map([], row_to_item)?.collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn get_item(&self, id: i64) -> StoreResult<Option<Item>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS))?;
        let mut rows = stmt.query_map(params![id], row_to_item)?;
        let item = rows.next().transpose()?;
        Ok(item)
    }

    pub fn item_exists(&self, id: i64) -> StoreResult<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM items WHERE id = ?", params![id], |r| r.get(0))?;
        Ok(count > 0)
    }

    /// Returns the stored item with its assigned id.
    pub fn create_item(&self, item: &Item) -> StoreResult<Item> {
        let conn = self.conn()?;
        let id = insert_item(&conn, item)?;
        tracing::debug!("Created item {} ({})", id, item.name);
        Ok(item.with_id(id))
    }

    /// Full replacement of name, price and is_offer.
    pub fn update_item(&self, id: i64, item: &Item) -> StoreResult<Item> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE items SET name = ?, price = ?, is_offer = ? WHERE id = ?",
            params![item.name, item.price, item.is_offer, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(ITEM_NOT_FOUND.to_string()));
        }
        Ok(item.with_id(id))
    }

    pub fn delete_item(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM items WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(ITEM_NOT_FOUND.to_string()));
        }
        Ok(())
    }

    pub fn search_items(&self, filters: &SearchFilters) -> StoreResult<Vec<Item>> {
        let mut conditions = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        // Name search (case-insensitive substring)
        if let Some(name) = filters.name.as_deref().filter(|n| !n.is_empty()) {
            conditions.push("name ILIKE ?");
            values.push(Value::Text(format!("%{}%", name)));
        }
        if let Some(min) = filters.price_min {
            conditions.push("price >= ?");
            values.push(Value::Double(min));
        }
        if let Some(max) = filters.price_max {
            conditions.push("price <= ?");
            values.push(Value::Double(max));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("SELECT {} FROM items{} ORDER BY id", ITEM_COLUMNS, where_clause);
        tracing::debug!("Item search: {}", sql);

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values), row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Fails with `Conflict` if the username or the email is already taken.
    pub fn create_user(&self, user: &User) -> StoreResult<User> {
        let conn = self.conn()?;
        let taken: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ? OR email = ?",
            params![user.username, user.email],
            |r| r.get(0),
        )?;
        if taken > 0 {
            return Err(StoreError::Conflict(USER_CONFLICT.to_string()));
        }
        let id = insert_user(&conn, user)?;
        tracing::debug!("Created user {} ({})", id, user.username);
        Ok(user.with_id(id))
    }

    pub fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))?;
        let users = stmt.query_map([], row_to_user)?.collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

fn next_id(conn: &Connection, sequence: &str) -> duckdb::Result<i64> {
    conn.query_row(&format!("SELECT nextval('{}')", sequence), [], |r| r.get(0))
}

fn insert_item(conn: &Connection, item: &Item) -> StoreResult<i64> {
    let id = next_id(conn, "item_id_seq")?;
    conn.execute(
        "INSERT INTO items (id, name, price, is_offer) VALUES (?, ?, ?, ?)",
        params![id, item.name, item.price, item.is_offer],
    )?;
    Ok(id)
}

fn insert_user(conn: &Connection, user: &User) -> StoreResult<i64> {
    let id = next_id(conn, "user_id_seq")?;
    conn.execute(
        "INSERT INTO users (id, username, email, full_name) VALUES (?, ?, ?, ?)",
        params![id, user.username, user.email, user.full_name],
    )?;
    Ok(id)
}
