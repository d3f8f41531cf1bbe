//! Remote Operation Gateway - abstraction boundary for the source-control system.
//!
//! Each call site (edit, retrieve, retrieve with dependencies) supplies its own
//! implementation. The engine never inspects how a call is made, only the
//! [`Outcome`] it returns.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    outcome::Outcome,
    types::{BatchItem, LockToken},
};

/// Remote calls the signout protocol needs.
///
/// # Async Support
///
/// This trait uses `async_trait` for async method support.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Element identifier.
    type Item: BatchItem;
    /// Signout credentials.
    type Token: LockToken;
    /// Whatever a successful fetch yields.
    type Content: Send + 'static;

    /// Fetch the element and sign it out.
    async fn lock(&self, item: &Self::Item, token: &Self::Token) -> Outcome<Self::Content>;

    /// Fetch the element and sign it out, taking the signout from its holder.
    async fn lock_forced(&self, item: &Self::Item, token: &Self::Token) -> Outcome<Self::Content>;

    /// Fetch a copy of the element without signing it out.
    async fn read_only(&self, item: &Self::Item) -> Outcome<Self::Content>;
}

#[async_trait]
impl<G> Gateway for Arc<G>
where
    G: Gateway + ?Sized,
{
    type Item = G::Item;
    type Token = G::Token;
    type Content = G::Content;

    async fn lock(&self, item: &Self::Item, token: &Self::Token) -> Outcome<Self::Content> {
        (**self).lock(item, token).await
    }

    async fn lock_forced(&self, item: &Self::Item, token: &Self::Token) -> Outcome<Self::Content> {
        (**self).lock_forced(item, token).await
    }

    async fn read_only(&self, item: &Self::Item) -> Outcome<Self::Content> {
        (**self).read_only(item).await
    }
}
