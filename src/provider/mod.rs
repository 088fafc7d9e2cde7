//! # Secret Store Providers
//!
//! The `SecretStoreClient` trait is the seam between the dumper and a concrete
//! secret store. Azure Key Vault is the only implementation shipped.

pub mod azure;

use crate::error::{DumpError, Result};
use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};

/// Secret metadata returned by listing, without the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretDescriptor {
    pub name: String,
    /// `None` when the listing does not name a version (current version)
    pub version: Option<String>,
    pub enabled: bool,
}

impl SecretDescriptor {
    pub fn new(name: impl Into<String>, version: Option<&str>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            version: version.map(ToString::to_string),
            enabled,
        }
    }
}

/// Fetched secret payload
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue {
    pub name: String,
    pub value: String,
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValue")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One page of a listing
#[derive(Debug, Clone, Default)]
pub struct DescriptorPage {
    pub descriptors: Vec<SecretDescriptor>,
    /// Opaque continuation link; `None` on the last page
    pub next_link: Option<String>,
}

/// Secret store capability used by the dumper
#[async_trait]
pub trait SecretStoreClient: Send + Sync {
    /// Fetch one listing page
    ///
    /// `next_link` is `None` for the first page, then the link returned by the
    /// previous page.
    async fn list_page(&self, next_link: Option<&str>) -> Result<DescriptorPage>;

    /// Fetch a secret value; `Ok(None)` means the secret no longer exists
    async fn fetch_secret(&self, name: &str, version: Option<&str>) -> Result<Option<SecretValue>>;
}

enum PageCursor {
    First,
    Next(String),
    Done,
}

/// Forward-only stream of listing pages
///
/// Each page is a new remote call; the stream stops after the page without a
/// `next_link` and yields the first error it meets.
pub fn list_pages<C>(client: &C) -> impl Stream<Item = Result<DescriptorPage>> + '_
where
    C: SecretStoreClient + ?Sized,
{
    stream::try_unfold(PageCursor::First, move |cursor| async move {
        let link = match cursor {
            PageCursor::Done => return Ok::<_, DumpError>(None),
            PageCursor::First => None,
            PageCursor::Next(link) => Some(link),
        };
        let mut page = client.list_page(link.as_deref()).await?;
        let next = match page.next_link.take() {
            Some(link) if !link.is_empty() => PageCursor::Next(link),
            _ => PageCursor::Done,
        };
        Ok(Some((page, next)))
    })
}

/// Listing flattened into descriptors, in store order
pub fn list_descriptors<C>(client: &C) -> impl Stream<Item = Result<SecretDescriptor>> + '_
where
    C: SecretStoreClient + ?Sized,
{
    list_pages(client)
        .map_ok(|page| stream::iter(page.descriptors.into_iter().map(Ok::<_, DumpError>)))
        .try_flatten()
}
