//! Binary serialization of computed recipes.
//!
//! This module provides a stable binary format for persisting a
//! [`RecipeCache`](crate::RecipeCache). The format consists of a 32-byte fixed
//! header followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"ANVL"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! Trees are stored as a flat pre-order node list; node ids are implied by
//! position and reassigned on load.
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Combine, ComputedRecipe, Leaf, LeafItem, ModifierLevel, NodeId, OpNode, TotalCost};
use crate::{xp, RecipeCache};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"ANVL";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;
/// Deepest tree accepted on load.
const MAX_TREE_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`RecipeCache`](crate::RecipeCache) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode recipes: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`RecipeCache`](crate::RecipeCache) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not an anvil-plan cache: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("cache was built from a different source; recompute it")]
    StaleSource,

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedCache {
    metadata: CacheMetadata,
    recipes: Vec<SerializedRecipe>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMetadata {
    recipe_count: usize,
    cost_cap: u32,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRecipe {
    name: String,
    /// `None` for an infeasible recipe.
    total: Option<u32>,
    step_costs: Vec<u32>,
    incremental_points: u64,
    bulk_points: u64,
    /// Tree nodes in pre-order.
    nodes: Vec<SerializedNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedNode {
    Target {
        label: String,
    },
    Book {
        label: String,
        kind: String,
        level: u32,
    },
    Combine {
        label: String,
        cost: u32,
        points: u64,
        prior_work: u32,
        modifiers: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Tree flattening (tree -> pre-order list)
// ---------------------------------------------------------------------------

fn flatten_tree(tree: &OpNode) -> Vec<SerializedNode> {
    tree.nodes()
        .into_iter()
        .map(|node| match node {
            OpNode::Leaf(Leaf {
                label,
                item: LeafItem::Target,
                ..
            }) => SerializedNode::Target {
                label: label.clone(),
            },
            OpNode::Leaf(Leaf {
                label,
                item: LeafItem::Book(modifier),
                ..
            }) => SerializedNode::Book {
                label: label.clone(),
                kind: modifier.kind.to_string(),
                level: modifier.level,
            },
            OpNode::Combine(combine) => SerializedNode::Combine {
                label: combine.label.clone(),
                cost: combine.cost,
                points: combine.points,
                prior_work: combine.prior_work,
                modifiers: combine.modifiers.clone(),
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tree unflattening (pre-order list -> tree)
// ---------------------------------------------------------------------------

fn unflatten_tree(nodes: Vec<SerializedNode>) -> Result<OpNode, DeserializeError> {
    check_depth(&nodes)?;
    let mut iter = nodes.into_iter();
    let mut tree = build_node(&mut iter)?;
    if iter.next().is_some() {
        return Err(DeserializeError::Validation(
            "trailing nodes after a complete tree".to_owned(),
        ));
    }
    tree.assign_ids();
    Ok(tree)
}

/// Reject trees deeper than [`MAX_TREE_DEPTH`] before any recursive walk.
fn check_depth(nodes: &[SerializedNode]) -> Result<(), DeserializeError> {
    // open combines, each with the number of children still to come
    let mut open: Vec<u8> = Vec::new();
    for node in nodes {
        while open.last() == Some(&0) {
            open.pop();
        }
        if open.len() >= MAX_TREE_DEPTH {
            return Err(DeserializeError::Validation(format!(
                "tree deeper than {MAX_TREE_DEPTH} levels"
            )));
        }
        if let Some(remaining) = open.last_mut() {
            *remaining -= 1;
        }
        if matches!(node, SerializedNode::Combine { .. }) {
            open.push(2);
        }
    }
    Ok(())
}

fn build_node(iter: &mut impl Iterator<Item = SerializedNode>) -> Result<OpNode, DeserializeError> {
    let node = iter.next().ok_or_else(|| {
        DeserializeError::Validation("tree ends before every combine has two children".to_owned())
    })?;
    Ok(match node {
        SerializedNode::Target { label } => OpNode::Leaf(Leaf {
            id: NodeId::default(),
            label,
            item: LeafItem::Target,
        }),
        SerializedNode::Book { label, kind, level } => OpNode::Leaf(Leaf {
            id: NodeId::default(),
            label,
            item: LeafItem::Book(ModifierLevel::new(kind, level)),
        }),
        SerializedNode::Combine {
            label,
            cost,
            points,
            prior_work,
            modifiers,
        } => {
            let kept = build_node(iter)?;
            let consumed = build_node(iter)?;
            OpNode::Combine(Combine {
                id: NodeId::default(),
                kept: Box::new(kept),
                consumed: Box::new(consumed),
                cost,
                points,
                prior_work,
                label,
                modifiers,
            })
        }
    })
}

// ---------------------------------------------------------------------------
// RecipeCache <-> SerializedCache
// ---------------------------------------------------------------------------

fn cache_to_serialized(cache: &RecipeCache, source_text: Option<&str>) -> SerializedCache {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    let recipes: Vec<SerializedRecipe> = cache
        .iter()
        .map(|(name, recipe)| SerializedRecipe {
            name: name.to_owned(),
            total: recipe.total.levels(),
            step_costs: recipe.step_costs.clone(),
            incremental_points: recipe.incremental_points,
            bulk_points: recipe.bulk_points,
            nodes: flatten_tree(&recipe.tree),
        })
        .collect();

    SerializedCache {
        metadata: CacheMetadata {
            recipe_count: recipes.len(),
            cost_cap: cache.cost_cap(),
            source_digest,
        },
        recipes,
    }
}

fn serialized_to_cache(ser: SerializedCache) -> Result<RecipeCache, DeserializeError> {
    if ser.metadata.recipe_count != ser.recipes.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} recipes but payload has {}",
            ser.metadata.recipe_count,
            ser.recipes.len()
        )));
    }

    let cost_cap = ser.metadata.cost_cap;
    let entries = ser
        .recipes
        .into_iter()
        .map(|sr| {
            let recipe = ComputedRecipe {
                tree: unflatten_tree(sr.nodes)?,
                total: sr.total.map_or(TotalCost::Infeasible, TotalCost::Levels),
                step_costs: sr.step_costs,
                incremental_points: sr.incremental_points,
                bulk_points: sr.bulk_points,
            };
            validate_recipe(&sr.name, &recipe, cost_cap)?;
            Ok((sr.name, recipe))
        })
        .collect::<Result<Vec<_>, DeserializeError>>()?;

    Ok(RecipeCache::from_parts(cost_cap, entries))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_recipe(name: &str, recipe: &ComputedRecipe, cost_cap: u32) -> Result<(), DeserializeError> {
    let fail = |msg: String| Err(DeserializeError::Validation(format!("recipe '{name}': {msg}")));

    let steps = recipe.tree.steps();

    match recipe.total {
        TotalCost::Infeasible => {
            if !recipe.tree.is_leaf() || !recipe.step_costs.is_empty() {
                return fail("infeasible recipe must be a bare target leaf".to_owned());
            }
            return Ok(());
        }
        TotalCost::Levels(total) => {
            let sum: u64 = recipe.step_costs.iter().map(|&c| u64::from(c)).sum();
            if sum != u64::from(total) {
                return fail(format!("total {total} but steps sum to {sum}"));
            }
        }
    }

    if steps.len() != recipe.step_costs.len() {
        return fail(format!(
            "{} combine nodes but {} step costs",
            steps.len(),
            recipe.step_costs.len()
        ));
    }
    for (step, &cost) in steps.iter().zip(&recipe.step_costs) {
        if step.cost != cost {
            return fail(format!("step {} costs {} but list says {cost}", step.id, step.cost));
        }
        if cost > cost_cap {
            return fail(format!("step {} costs {cost}, above cap {cost_cap}", step.id));
        }
        if step.points != xp::points_for_level(cost) {
            return fail(format!("step {} has inconsistent points", step.id));
        }
    }

    let targets = recipe
        .tree
        .leaves()
        .iter()
        .filter(|leaf| leaf.item == LeafItem::Target)
        .count();
    if targets != 1 {
        return fail(format!("expected one target leaf, found {targets}"));
    }

    if recipe.incremental_points != xp::incremental_total(&recipe.step_costs)
        || recipe.bulk_points != xp::bulk_total(&recipe.step_costs)
    {
        return fail("point totals do not match step costs".to_owned());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] engine version, bytes[8..12] flags
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(
    cache: &RecipeCache,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = cache_to_serialized(cache, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decode a cache; with `expected_source`, also require a matching digest.
pub(crate) fn decode(
    bytes: &[u8],
    expected_source: Option<&str>,
) -> Result<RecipeCache, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedCache, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    if let Some(source) = expected_source {
        let expected = *blake3::hash(source.as_bytes()).as_bytes();
        if serialized.metadata.source_digest != Some(expected) {
            return Err(DeserializeError::StaleSource);
        }
    }

    serialized_to_cache(serialized)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
