//! Artifact generation contract and renderers.
//!
//! An artifact is an immutable rendered document (invoice or daily
//! summary) produced as a side effect of the engines. The engines call
//! the generator unconditionally but never fail the primary operation
//! when rendering fails.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{DailySummary, Order};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from artifact rendering.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Writing the rendered document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The renderer is unavailable.
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),
}

/// Reference to a rendered artifact, e.g. `invoice_order_2024-03-15_jane@example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    /// Creates an artifact reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns the canonical artifact name for an order's invoice.
pub fn invoice_name(order: &Order) -> String {
    format!("invoice_{}", order.id)
}

/// Returns the canonical artifact name for a daily summary.
pub fn summary_name(summary: &DailySummary) -> String {
    format!("summary_{}", summary.date)
}

/// Renders invoices and daily summaries.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Renders an invoice for a placed order.
    async fn render_invoice(&self, order: &Order) -> Result<ArtifactRef, ArtifactError>;

    /// Renders a daily summary document.
    async fn render_summary(&self, summary: &DailySummary) -> Result<ArtifactRef, ArtifactError>;
}

/// Filesystem-backed generator writing plain-text documents.
///
/// Document formatting is deliberately minimal; the layout a customer
/// sees is owned by the rendering layer outside the core.
#[derive(Clone)]
pub struct FileArtifactGenerator {
    dir: PathBuf,
}

impl FileArtifactGenerator {
    /// Creates a generator writing into `dir` (created on first render).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn write(&self, name: &str, contents: String) -> Result<ArtifactRef, ArtifactError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{name}.txt"));
        tokio::fs::write(&path, contents).await?;
        Ok(ArtifactRef::new(name))
    }
}

#[async_trait]
impl ArtifactGenerator for FileArtifactGenerator {
    async fn render_invoice(&self, order: &Order) -> Result<ArtifactRef, ArtifactError> {
        let mut doc = format!(
            "INVOICE {}\nDate: {}\nCustomer: {} <{}>\n\n",
            order.id, order.order_date, order.customer.name, order.customer.email
        );
        for item in &order.items {
            doc.push_str(&format!(
                "{:>3} x {:<20} @ {:>8}  = {:>8}\n",
                item.quantity,
                item.product_name,
                item.unit_price.to_string(),
                item.line_total().to_string()
            ));
        }
        doc.push_str(&format!("\nTotal: {}\n", order.order_total));

        self.write(&invoice_name(order), doc).await
    }

    async fn render_summary(&self, summary: &DailySummary) -> Result<ArtifactRef, ArtifactError> {
        let doc = format!(
            "DAILY SUMMARY {}\nOrders: {}\nRevenue: {}\nMost popular: {}\n",
            summary.date,
            summary.total_orders,
            summary.total_revenue,
            summary.most_popular_product.as_deref().unwrap_or("-")
        );

        self.write(&summary_name(summary), doc).await
    }
}

/// In-memory generator for tests: records what was rendered and can be
/// told to fail.
#[derive(Clone, Default)]
pub struct InMemoryArtifactGenerator {
    rendered: Arc<RwLock<Vec<ArtifactRef>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryArtifactGenerator {
    /// Creates a new recording generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the generator to fail all renders.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns all rendered artifact references, in render order.
    pub async fn rendered(&self) -> Vec<ArtifactRef> {
        self.rendered.read().await.clone()
    }

    /// Returns how many artifacts were rendered.
    pub async fn render_count(&self) -> usize {
        self.rendered.read().await.len()
    }

    async fn record(&self, name: String) -> Result<ArtifactRef, ArtifactError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ArtifactError::Unavailable("renderer down".to_string()));
        }
        let artifact = ArtifactRef::new(name);
        self.rendered.write().await.push(artifact.clone());
        Ok(artifact)
    }
}

#[async_trait]
impl ArtifactGenerator for InMemoryArtifactGenerator {
    async fn render_invoice(&self, order: &Order) -> Result<ArtifactRef, ArtifactError> {
        self.record(invoice_name(order)).await
    }

    async fn render_summary(&self, summary: &DailySummary) -> Result<ArtifactRef, ArtifactError> {
        self.record(summary_name(summary)).await
    }
}
