// Reference resolution: every `$ref` is replaced by a copy of its target before
// the document is deserialized, so the typed model only ever sees inline values.

use std::collections::{HashMap, VecDeque};

use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use super::{DocumentSource, LoadError, Result};
use crate::parser::parse_swagger_str;
use crate::utils::split_fragment;

/// Parsed documents keyed by their URL without fragment
pub type Documents = HashMap<Url, Value>;

/// Fetch `root` and every document reachable from it through `$ref`s
pub async fn fetch_all(
    source: &DocumentSource,
    root: &Url,
    allow_external: bool,
) -> Result<Documents> {
    let mut documents = Documents::new();
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(url) = queue.pop_front() {
        if documents.contains_key(&url) {
            continue;
        }

        let text = source.fetch(&url).await?;
        let value = parse_swagger_str(&text).map_err(|source| LoadError::Parse {
            location: url.to_string(),
            source,
        })?;

        for reference in collect_refs(&value) {
            let (document, _) = split_fragment(&join_ref(&url, reference)?);
            if document == url || documents.contains_key(&document) || queue.contains(&document) {
                continue;
            }
            if !allow_external {
                return Err(LoadError::ExternalRefNotAllowed(reference.to_string()));
            }
            trace!(%document, "queueing external document");
            queue.push_back(document);
        }

        documents.insert(url, value);
    }

    Ok(documents)
}

/// All `$ref` strings in a document, in traversal order
pub fn collect_refs(value: &Value) -> Vec<&str> {
    let mut refs = Vec::new();
    let mut pending = vec![value];

    while let Some(value) = pending.pop() {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    refs.push(reference.as_str());
                } else {
                    pending.extend(map.values());
                }
            }
            Value::Array(items) => pending.extend(items),
            _ => {}
        }
    }

    refs
}

fn join_ref(base: &Url, reference: &str) -> Result<Url> {
    base.join(reference).map_err(|source| LoadError::InvalidRef {
        reference: reference.to_string(),
        source,
    })
}

/// Inlines references against a set of already fetched documents.
///
/// Every use of a reference receives its own copy of the target, so a small
/// document whose schemas reference each other repeatedly can expand
/// exponentially. The number of values produced is capped at `limit`.
pub struct Resolver<'a> {
    documents: &'a Documents,
    limit: usize,
    produced: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(documents: &'a Documents, limit: usize) -> Self {
        Resolver {
            documents,
            limit,
            produced: 0,
        }
    }

    /// Produce a copy of the document at `root` with every reference inlined
    pub fn resolve(mut self, root: &Url) -> Result<Value> {
        let documents = self.documents;
        let document = documents
            .get(root)
            .ok_or_else(|| LoadError::UnresolvedRef {
                reference: root.to_string(),
                location: root.to_string(),
            })?;

        let mut stack = Vec::new();
        let resolved = self.inline(document, root, &mut stack)?;
        debug!(values = self.produced, "inlined references");

        Ok(resolved)
    }

    fn count(&mut self) -> Result<()> {
        self.produced += 1;
        if self.produced > self.limit {
            return Err(LoadError::TooLarge { limit: self.limit });
        }
        Ok(())
    }

    fn inline(&mut self, value: &'a Value, base: &Url, stack: &mut Vec<Url>) -> Result<Value> {
        match value {
            Value::Object(map) => {
                // Siblings of `$ref` carry no meaning in OpenAPI 3.0
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.follow(value, reference, base, stack);
                }

                self.count()?;
                let mut inlined = Map::new();
                for (key, item) in map {
                    inlined.insert(key.clone(), self.inline(item, base, stack)?);
                }
                Ok(Value::Object(inlined))
            }
            Value::Array(items) => {
                self.count()?;
                items
                    .iter()
                    .map(|item| self.inline(item, base, stack))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            other => {
                self.count()?;
                Ok(other.clone())
            }
        }
    }

    fn follow(
        &mut self,
        ref_object: &'a Value,
        reference: &str,
        base: &Url,
        stack: &mut Vec<Url>,
    ) -> Result<Value> {
        let target = join_ref(base, reference)?;

        if stack.contains(&target) {
            debug!(reference, "leaving cyclic reference in place");
            self.count()?;
            return Ok(ref_object.clone());
        }

        let unresolved = || LoadError::UnresolvedRef {
            reference: reference.to_string(),
            location: base.to_string(),
        };

        let (document_url, pointer) = split_fragment(&target);
        let documents = self.documents;
        let target_value = documents
            .get(&document_url)
            .and_then(|document| document.pointer(&pointer))
            .ok_or_else(unresolved)?;

        stack.push(target);
        let resolved = self.inline(target_value, &document_url, stack);
        stack.pop();

        resolved
    }
}
