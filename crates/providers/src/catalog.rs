//! Static Anthropic model catalog and capability lookups.
//!
//! The tables here are process-wide and read-only. Live discovery results are
//! appended to [`KNOWN_MODELS`] by the catalog resolver; they never modify it.

use std::{collections::HashSet, sync::LazyLock};

/// Static metadata for a known model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelMetadata {
    pub id: &'static str,
    pub display_name: &'static str,
    pub tool_calling: bool,
    pub deprecated: bool,
}

const fn model(id: &'static str, display_name: &'static str, tool_calling: bool) -> ModelMetadata {
    ModelMetadata {
        id,
        display_name,
        tool_calling,
        deprecated: false,
    }
}

const fn deprecated(id: &'static str, display_name: &'static str) -> ModelMetadata {
    ModelMetadata {
        id,
        display_name,
        tool_calling: true,
        deprecated: true,
    }
}

/// Known Anthropic models. Current models listed first, then models without
/// tool calling, then deprecated snapshots.
pub const ANTHROPIC_MODELS_DETAILED: &[ModelMetadata] = &[
    model("claude-opus-4-20250514", "Claude Opus 4", true),
    model("claude-sonnet-4-20250514", "Claude Sonnet 4", true),
    model("claude-3-7-sonnet-latest", "Claude 3.7 Sonnet", true),
    model("claude-3-5-sonnet-latest", "Claude 3.5 Sonnet", true),
    model("claude-3-5-haiku-latest", "Claude 3.5 Haiku", true),
    model("claude-3-opus-latest", "Claude 3 Opus", true),
    model("claude-3-sonnet-20240229", "Claude 3 Sonnet", false),
    model("claude-3-haiku-20240307", "Claude 3 Haiku", false),
    deprecated("claude-3-5-sonnet-20240620", "Claude 3.5 Sonnet (2024-06-20)"),
    deprecated("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet (2024-10-22)"),
    deprecated("claude-3-5-haiku-20241022", "Claude 3.5 Haiku (2024-10-22)"),
];

/// Non-deprecated model IDs, in table order. This is the fallback catalog.
pub static KNOWN_MODELS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    ANTHROPIC_MODELS_DETAILED
        .iter()
        .filter(|m| !m.deprecated)
        .map(|m| m.id)
        .collect()
});

/// Models statically known to support tool calling.
pub static TOOL_SUPPORTED: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ANTHROPIC_MODELS_DETAILED
        .iter()
        .filter(|m| !m.deprecated && m.tool_calling)
        .map(|m| m.id)
        .collect()
});

/// Models statically known not to support tool calling.
pub static TOOL_UNSUPPORTED: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ANTHROPIC_MODELS_DETAILED
        .iter()
        .filter(|m| !m.deprecated && !m.tool_calling)
        .map(|m| m.id)
        .collect()
});

/// Deprecated snapshots still accepted by the API.
pub static DEPRECATED_MODELS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    ANTHROPIC_MODELS_DETAILED
        .iter()
        .filter(|m| m.deprecated)
        .map(|m| m.id)
        .collect()
});

/// Static capability tag for a model ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCalling {
    Supported,
    Unsupported,
    Unknown,
}

/// The three lookup tables the resolver consults.
///
/// [`StaticCatalog::anthropic`] copies the process-wide tables; other
/// instances exist so resolver behaviour can be exercised against arbitrary
/// catalogs.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    known: Vec<String>,
    supported: HashSet<String>,
    unsupported: HashSet<String>,
}

impl StaticCatalog {
    /// The built-in Anthropic catalog.
    #[must_use]
    pub fn anthropic() -> Self {
        Self {
            known: KNOWN_MODELS.iter().map(|id| (*id).to_string()).collect(),
            supported: TOOL_SUPPORTED.iter().map(|id| (*id).to_string()).collect(),
            unsupported: TOOL_UNSUPPORTED.iter().map(|id| (*id).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn new(
        known: impl IntoIterator<Item = impl Into<String>>,
        supported: impl IntoIterator<Item = impl Into<String>>,
        unsupported: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            known: known.into_iter().map(Into::into).collect(),
            supported: supported.into_iter().map(Into::into).collect(),
            unsupported: unsupported.into_iter().map(Into::into).collect(),
        }
    }

    /// Fallback model list, in catalog order.
    #[must_use]
    pub fn known(&self) -> &[String] {
        &self.known
    }

    #[must_use]
    pub fn tool_calling(&self, model_id: &str) -> ToolCalling {
        if self.supported.contains(model_id) {
            ToolCalling::Supported
        } else if self.unsupported.contains(model_id) {
            ToolCalling::Unsupported
        } else {
            ToolCalling::Unknown
        }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::anthropic()
    }
}

/// Static metadata for a model ID, if it is in the built-in table.
#[must_use]
pub fn metadata(model_id: &str) -> Option<&'static ModelMetadata> {
    ANTHROPIC_MODELS_DETAILED.iter().find(|m| m.id == model_id)
}

/// Check if a model supports tool calling.
///
/// Built-in table entries answer directly. Unknown IDs are judged by family:
/// Claude 1/2 and Claude Instant predate tool use, every later Claude model
/// supports it.
#[must_use]
pub fn supports_tools_for_model(model_id: &str) -> bool {
    if let Some(meta) = metadata(model_id) {
        return meta.tool_calling;
    }
    !is_legacy_family(model_id)
}

/// Check if a model accepts image inputs. Claude 3 and later do.
#[must_use]
pub fn supports_vision_for_model(model_id: &str) -> bool {
    model_id.trim().starts_with("claude-") && !is_legacy_family(model_id)
}

fn is_legacy_family(model_id: &str) -> bool {
    let id = model_id.trim();
    id.starts_with("claude-instant") || id.starts_with("claude-2") || id.starts_with("claude-1")
}

/// Context window size (in tokens) for a model ID.
#[must_use]
pub fn context_window_for_model(model_id: &str) -> u32 {
    let id = model_id.trim();
    if id.starts_with("claude-instant") || id.starts_with("claude-2.0") {
        return 100_000;
    }
    200_000
}
