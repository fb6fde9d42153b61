use super::{matches, project, Model, Query, Record, RecordId};
use crate::error::{ErrorKind, Result};
use actix_web::web;
use async_trait::async_trait;
use error_chain::bail;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde_json::Value as JsonValue;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Relational backend: one table per model, the row id is the record id and
/// the remaining fields are kept as a JSON document in `data`.
pub struct SqliteModel {
  db_pool: DbPool,
  table: String,
}

impl SqliteModel {
  /// Creates the backing table when missing.
  pub fn new(db_pool: DbPool, table: &str) -> Result<Self> {
    if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
      bail!(ErrorKind::InvalidTableName(table.to_string()));
    }
    db_pool.get()?.execute(
      &format!(
        "create table if not exists `{}` (
          `id` integer primary key autoincrement,
          `data` text not null
        )",
        table
      ),
      params![],
    )?;
    Ok(SqliteModel {
      db_pool,
      table: table.to_string(),
    })
  }

  /*
   * receive a connection from the pool on the blocking thread pool,
   * and pass it to the inner closure
   */
  async fn block<F, I>(&self, f: F) -> Result<I>
  where
    F: FnOnce(PooledConnection<SqliteConnectionManager>, String) -> Result<I> + Send + 'static,
    I: Send + 'static,
  {
    let db_pool = self.db_pool.clone();
    let table = self.table.clone();
    web::block(move || f(db_pool.get()?, table)).await?
  }
}

fn row_id(id: &RecordId) -> Result<i64> {
  match id {
    RecordId::Int(id) => Ok(*id),
    RecordId::Opaque(raw) => raw
      .parse()
      .map_err(|_| ErrorKind::InvalidId(raw.to_string()).into()),
  }
}

fn to_record(id: i64, data: &str) -> Result<Record> {
  let mut record: Record = serde_json::from_str(data)?;
  record.insert("id".to_string(), JsonValue::from(id));
  Ok(record)
}

fn encode(mut data: Record) -> Result<String> {
  data.remove("id");
  Ok(serde_json::to_string(&data)?)
}

fn select(db: &rusqlite::Connection, table: &str, id: i64) -> Result<Option<Record>> {
  let data = db
    .query_row(
      &format!("select `data` from `{}` where `id` = :id", table),
      params![id],
      |row| row.get::<_, String>(0),
    )
    .optional()?;
  data.map(|data| to_record(id, &data)).transpose()
}

#[async_trait(?Send)]
impl Model for SqliteModel {
  async fn find(&self, query: &Query, fields: &str) -> Result<Vec<Record>> {
    let query = query.clone();
    let fields = fields.to_string();
    self
      .block(move |db, table| -> Result<_> {
        let mut stmt = db.prepare(&format!("select `id`, `data` from `{}` order by `id` asc", table))?;
        let rows = stmt
          .query_map(params![], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
          .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut records = vec![];
        for (id, data) in rows {
          let record = to_record(id, &data)?;
          if matches(&record, &query) {
            records.push(project(record, &fields));
          }
        }
        Ok(records)
      })
      .await
  }

  async fn create(&self, data: Record) -> Result<Record> {
    let encoded = encode(data)?;
    self
      .block(move |db, table| -> Result<_> {
        db.execute(
          &format!("insert into `{}` (`data`) values (:data)", table),
          params![encoded],
        )?;
        to_record(db.last_insert_rowid(), &encoded)
      })
      .await
  }

  async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>> {
    let id = row_id(id)?;
    self.block(move |db, table| select(&db, &table, id)).await
  }

  async fn update_by_id(&self, id: &RecordId, data: Record) -> Result<Option<Record>> {
    let id = row_id(id)?;
    self
      .block(move |mut db, table| -> Result<_> {
        let transaction = db.transaction()?;

        let mut record = match select(&transaction, &table, id)? {
          Some(record) => record,
          None => return Ok(None),
        };
        for (key, value) in data {
          if key != "id" {
            record.insert(key, value);
          }
        }
        transaction.execute(
          &format!("update `{}` set `data` = :data where `id` = :id", table),
          params![encode(record.clone())?, id],
        )?;

        transaction.commit()?;
        Ok(Some(record))
      })
      .await
  }

  async fn remove_by_id(&self, id: &RecordId) -> Result<Option<Record>> {
    let id = row_id(id)?;
    self
      .block(move |mut db, table| -> Result<_> {
        let transaction = db.transaction()?;
        let record = select(&transaction, &table, id)?;
        if record.is_some() {
          transaction.execute(&format!("delete from `{}` where `id` = :id", table), params![id])?;
        }
        transaction.commit()?;
        Ok(record)
      })
      .await
  }
}
