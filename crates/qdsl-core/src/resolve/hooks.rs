//! The resolution hook protocol (§4.H): a caller-supplied escape hatch
//! for attribute names the schema alone can't explain — computed
//! columns, renamed fields, virtual relationships.
//!
//! Hooks are consulted only once the schema has failed to resolve a
//! path segment, in registration order, and the first one that returns
//! `Some` wins. A hook only ever reads the AST; it can append joins to
//! the plan it's handed but never rewrites what's already there.

use async_trait::async_trait;
use qdsl_sql::SqlFragment;

use super::JoinPlan;

/// What a hook is told about the path segment it's being asked to
/// resolve.
pub struct ResolutionContext<'a> {
    pub parent_alias: &'a str,
    pub attribute_name: &'a str,
    pub remaining_segments: &'a [String],
    pub join_plan: &'a mut JoinPlan,
    pub root_model: &'a str,
}

/// The three shapes a hook's resolution can take.
#[derive(Debug, Clone)]
pub enum HookResult {
    /// The attribute names a column directly, possibly on an alias the
    /// hook minted itself.
    EmittedColumn { alias: String, column: String },
    /// The hook pushed its own joins onto `join_plan`; resolution
    /// continues walking `remaining_segments` from `continue_alias`.
    AddedJoins { continue_alias: String },
    /// The attribute resolves to an opaque predicate fragment the
    /// translator should splice in as-is, e.g. a computed-column call.
    /// The fragment carries its own bound parameters (built the same way
    /// any other `SqlFragment` is, via `push_param`/`param`), so there's
    /// nothing more for the caller to supply.
    CustomPredicate { fragment: SqlFragment },
}

/// A single resolution hook.
#[async_trait]
pub trait ResolutionHook: Send + Sync {
    async fn resolve(&self, ctx: &mut ResolutionContext<'_>) -> Option<HookResult>;
}

/// An ordered collection of hooks, consulted first-match-wins.
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Box<dyn ResolutionHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn register(&mut self, hook: Box<dyn ResolutionHook>) {
        self.hooks.push(hook);
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub async fn resolve(&self, ctx: &mut ResolutionContext<'_>) -> Option<HookResult> {
        for (i, hook) in self.hooks.iter().enumerate() {
            if let Some(result) = hook.resolve(ctx).await {
                tracing::debug!(hook_index = i, attribute = ctx.attribute_name, "hook resolved attribute");
                return Some(result);
            }
        }
        None
    }
}
