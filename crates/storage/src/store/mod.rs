#![forbid(unsafe_code)]

mod backend;
mod error;

pub use backend::StoreBackend;
pub use error::StoreError;

use lt_core::{GroupId, LabelCatalog, LabelPath, Namespace, ResourceId, ResourceRow, decode};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const DB_FILE_NAME: &str = "labeltree.db";
const MAX_ACTOR_LEN: usize = 128;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

/// Where a label lives: user labels are keyed by their owner, group labels by their group.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LabelKey {
    namespace: &'static str,
    owner: String,
    label: String,
}

impl LabelKey {
    fn for_actor(actor: &str, path: &LabelPath) -> Self {
        let (namespace, owner) = match path.namespace() {
            Namespace::User => ("user", actor.to_string()),
            Namespace::Group(group) => ("group", group.as_str().to_string()),
        };
        Self {
            namespace,
            owner,
            label: path.to_label(),
        }
    }
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref();
        std::fs::create_dir_all(storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        install_schema(&conn)?;
        tracing::debug!(path = %db_path.display(), "label store opened");

        Ok(Self { conn })
    }

    /// Returns `true` when the resource was not known before.
    pub fn register_resource(&mut self, id: &ResourceId) -> Result<bool, StoreError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO resources(id, created_at_ms) VALUES (?1, ?2)",
            params![id.as_str(), now_ms()],
        )?;
        Ok(inserted > 0)
    }

    /// Returns `true` when the actor was not a member before.
    pub fn join_group(&mut self, actor: &str, group: &GroupId) -> Result<bool, StoreError> {
        validate_actor(actor)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO group_members(group_id, actor) VALUES (?1, ?2)",
            params![group.as_str(), actor],
        )?;
        Ok(inserted > 0)
    }

    /// The actor's own labels plus the labels of every group the actor belongs to, each list in
    /// lexicographic order. Groups without labels still appear with an empty list.
    pub fn label_catalog(&self, actor: &str) -> Result<LabelCatalog, StoreError> {
        validate_actor(actor)?;

        let mut stmt = self.conn.prepare(
            "SELECT label FROM labels WHERE namespace = 'user' AND owner = ?1 ORDER BY label",
        )?;
        let user = stmt
            .query_map(params![actor], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT m.group_id, l.label
            FROM group_members m
            LEFT JOIN labels l ON l.namespace = 'group' AND l.owner = m.group_id
            WHERE m.actor = ?1
            ORDER BY m.group_id, l.label
            "#,
        )?;
        let pairs = stmt
            .query_map(params![actor], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups = BTreeMap::<GroupId, Vec<String>>::new();
        for (group, label) in pairs {
            let group = GroupId::try_new(group)
                .map_err(|_| StoreError::InvalidInput("stored group id is invalid"))?;
            let labels = groups.entry(group).or_default();
            if let Some(label) = label {
                labels.push(label);
            }
        }

        Ok(LabelCatalog { user, groups })
    }

    /// Fresh observations of the given resources as seen by `actor`, in the requested order.
    /// Only the actor's own user labels and the labels of the actor's groups are reported.
    pub fn resource_rows(
        &self,
        actor: &str,
        ids: &[ResourceId],
    ) -> Result<Vec<ResourceRow>, StoreError> {
        validate_actor(actor)?;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT label FROM resource_labels
            WHERE resource_id = ?1
              AND (
                (namespace = 'user' AND owner = ?2)
                OR (namespace = 'group'
                    AND owner IN (SELECT group_id FROM group_members WHERE actor = ?2))
              )
            ORDER BY label
            "#,
        )?;
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            if !resource_exists(&self.conn, id)? {
                return Err(StoreError::UnknownResource(id.clone()));
            }
            let labels = stmt
                .query_map(params![id.as_str(), actor], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(ResourceRow::new(id.clone(), labels));
        }
        Ok(rows)
    }

    /// Adds `label` to the actor's catalog. User labels are private to the actor, so two actors
    /// may own the same user label; group labels require the actor to be a member of the group.
    /// The label is stored in canonical encoding.
    pub fn create_label(&mut self, actor: &str, label: &str) -> Result<LabelPath, StoreError> {
        validate_actor(actor)?;
        let path = decode(label)?;
        let key = LabelKey::for_actor(actor, &path);

        let tx = self.conn.transaction()?;
        ensure_member_tx(&tx, actor, &path)?;
        if label_exists_tx(&tx, &key)? {
            return Err(StoreError::LabelAlreadyExists(key.label));
        }
        tx.execute(
            "INSERT INTO labels(namespace, owner, label, created_at_ms) VALUES (?1, ?2, ?3, ?4)",
            params![key.namespace, key.owner, key.label, now_ms()],
        )?;
        tx.commit()?;

        tracing::debug!(
            label = %key.label,
            namespace = key.namespace,
            owner = %key.owner,
            "label stored"
        );
        Ok(path)
    }

    pub fn assign_label(
        &mut self,
        actor: &str,
        resource: &ResourceId,
        label: &str,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let key = resolve_assignable_tx(&tx, actor, resource, label)?;
        tx.execute(
            r#"
            INSERT OR IGNORE INTO resource_labels(resource_id, namespace, owner, label)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![resource.as_str(), key.namespace, key.owner, key.label],
        )?;
        tx.commit()?;
        tracing::debug!(resource = %resource, label, actor, "label assigned");
        Ok(())
    }

    pub fn unassign_label(
        &mut self,
        actor: &str,
        resource: &ResourceId,
        label: &str,
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let key = resolve_assignable_tx(&tx, actor, resource, label)?;
        tx.execute(
            r#"
            DELETE FROM resource_labels
            WHERE resource_id = ?1 AND namespace = ?2 AND owner = ?3 AND label = ?4
            "#,
            params![resource.as_str(), key.namespace, key.owner, key.label],
        )?;
        tx.commit()?;
        tracing::debug!(resource = %resource, label, actor, "label unassigned");
        Ok(())
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS resources (
          id TEXT PRIMARY KEY,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS labels (
          namespace TEXT NOT NULL CHECK(namespace IN ('user', 'group')),
          owner TEXT NOT NULL,
          label TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          PRIMARY KEY(namespace, owner, label)
        );

        CREATE TABLE IF NOT EXISTS resource_labels (
          resource_id TEXT NOT NULL,
          namespace TEXT NOT NULL,
          owner TEXT NOT NULL,
          label TEXT NOT NULL,
          PRIMARY KEY(resource_id, namespace, owner, label),
          FOREIGN KEY(resource_id) REFERENCES resources(id) ON DELETE CASCADE,
          FOREIGN KEY(namespace, owner, label)
            REFERENCES labels(namespace, owner, label) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS group_members (
          group_id TEXT NOT NULL,
          actor TEXT NOT NULL,
          PRIMARY KEY(group_id, actor)
        );
        "#,
    )?;
    Ok(())
}

fn validate_actor(actor: &str) -> Result<(), StoreError> {
    if actor.trim().is_empty() {
        return Err(StoreError::InvalidInput("actor must not be empty"));
    }
    if actor.len() > MAX_ACTOR_LEN {
        return Err(StoreError::InvalidInput("actor is too long"));
    }
    if actor.chars().any(char::is_control) {
        return Err(StoreError::InvalidInput("actor contains control characters"));
    }
    Ok(())
}

fn resource_exists(conn: &Connection, id: &ResourceId) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM resources WHERE id = ?1",
            params![id.as_str()],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn label_exists_tx(tx: &Transaction<'_>, key: &LabelKey) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM labels WHERE namespace = ?1 AND owner = ?2 AND label = ?3",
            params![key.namespace, key.owner, key.label],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn is_group_member_tx(tx: &Transaction<'_>, group: &GroupId, actor: &str) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM group_members WHERE group_id = ?1 AND actor = ?2",
            params![group.as_str(), actor],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn ensure_member_tx(tx: &Transaction<'_>, actor: &str, path: &LabelPath) -> Result<(), StoreError> {
    if let Namespace::Group(group) = path.namespace()
        && !is_group_member_tx(tx, group, actor)?
    {
        return Err(StoreError::NotGroupMember {
            group: group.clone(),
            actor: actor.to_string(),
        });
    }
    Ok(())
}

/// Resolves `label` against the actor's catalog: another actor's user label is unknown here, and
/// a group label needs membership.
fn resolve_assignable_tx(
    tx: &Transaction<'_>,
    actor: &str,
    resource: &ResourceId,
    label: &str,
) -> Result<LabelKey, StoreError> {
    validate_actor(actor)?;
    let path = decode(label)?;
    if !resource_exists(tx, resource)? {
        return Err(StoreError::UnknownResource(resource.clone()));
    }
    ensure_member_tx(tx, actor, &path)?;
    let key = LabelKey::for_actor(actor, &path);
    if !label_exists_tx(tx, &key)? {
        return Err(StoreError::UnknownLabel(key.label));
    }
    Ok(key)
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
