use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::ops::ControlFlow;
use std::sync::RwLock;

use boreal_result::{Error, Result};
use bytes::Bytes;

use super::{normalize_prefix, Bucket, IterVisitor, ObjectAttributes};
use crate::cancel::CancelToken;

/// In-memory bucket used for tests and for running the engine without
/// persistence.
///
/// Objects live in an ordered map, so listing order is lexical by
/// construction. Ranged reads hand out cheap slices of the shared buffer.
#[derive(Default)]
pub struct MemBucket {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl MemBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .expect("MemBucket objects read lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored keys in lexical order.
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .read()
            .expect("MemBucket objects read lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl Bucket for MemBucket {
    fn upload(&self, token: &CancelToken, key: &str, body: &mut dyn Read) -> Result<()> {
        token.check()?;
        // The store itself is memory, so the assembled bytes are the object;
        // the body is still consumed in `Read`-sized chunks to EOF.
        let mut buf = Vec::new();
        body.read_to_end(&mut buf)?;
        self.objects
            .write()
            .expect("MemBucket objects write lock poisoned")
            .insert(key.to_string(), Bytes::from(buf));
        Ok(())
    }

    fn iter(&self, token: &CancelToken, prefix: &str, visit: IterVisitor<'_>) -> Result<()> {
        token.check()?;
        let prefix = normalize_prefix(prefix);

        // Snapshot the child set before visiting so callbacks are free to
        // issue reads (or uploads) against this same bucket.
        let children: Vec<String> = {
            let objects = self
                .objects
                .read()
                .expect("MemBucket objects read lock poisoned");
            let mut children = Vec::new();
            for key in objects
                .range(prefix.clone()..)
                .map(|(key, _)| key)
                .take_while(|key| key.starts_with(&prefix))
            {
                let rest = &key[prefix.len()..];
                let segment = rest.split('/').next().unwrap_or(rest);
                let child = format!("{prefix}{segment}");
                if children.last().map(String::as_str) != Some(child.as_str()) {
                    children.push(child);
                }
            }
            children
        };

        for child in &children {
            token.check()?;
            if let ControlFlow::Break(()) = visit(child)? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn attributes(&self, token: &CancelToken, key: &str) -> Result<ObjectAttributes> {
        token.check()?;
        let objects = self
            .objects
            .read()
            .expect("MemBucket objects read lock poisoned");
        let object = objects
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        Ok(ObjectAttributes {
            size: object.len() as u64,
        })
    }

    fn get_range(
        &self,
        token: &CancelToken,
        key: &str,
        offset: u64,
        len: u64,
    ) -> Result<Box<dyn Read + Send>> {
        token.check()?;
        let object = {
            let objects = self
                .objects
                .read()
                .expect("MemBucket objects read lock poisoned");
            objects
                .get(key)
                .cloned()
                .ok_or_else(|| Error::NotFound(key.to_string()))?
        };

        let size = object.len() as u64;
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= size)
            .ok_or_else(|| {
                Error::InvalidArgumentError(format!(
                    "range {offset}..{} out of bounds for '{key}' ({size} bytes)",
                    offset.saturating_add(len)
                ))
            })?;

        Ok(Box::new(Cursor::new(
            object.slice(offset as usize..end as usize),
        )))
    }
}
