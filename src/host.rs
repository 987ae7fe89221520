use tracing::{error, warn};

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::fetcher::BoundarySource;
use crate::loader::DataContext;
use crate::models::{DashboardOutputs, FilterCriteria, FilterEvent};

/// State of the host loop: the loaded data, the current criteria and an
/// optional boundary source fetched on every render.
pub struct HostSession<'a> {
    dashboard: &'a Dashboard,
    ctx: &'a DataContext,
    source: Option<&'a dyn BoundarySource>,
    criteria: FilterCriteria,
}

impl<'a> HostSession<'a> {
    /// Starts from the default selection over `ctx`.
    pub fn new(dashboard: &'a Dashboard, ctx: &'a DataContext, source: Option<&'a dyn BoundarySource>) -> Self {
        Self {
            dashboard,
            ctx,
            source,
            criteria: FilterCriteria::all(ctx.filter_options()),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub async fn render(&self) -> Result<DashboardOutputs> {
        match self.source {
            Some(source) => {
                self.dashboard
                    .render_with_boundaries(self.ctx, &self.criteria, source)
                    .await
            }
            None => self.dashboard.render(self.ctx, &self.criteria),
        }
    }

    /// Applies one input line as a `FilterEvent` and re-renders.
    ///
    /// Blank lines, invalid events and failed renders are logged and yield
    /// `None`. The session keeps its criteria and accepts the next line.
    pub async fn handle_line(&mut self, line: &str) -> Option<DashboardOutputs> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let event = match serde_json::from_str::<FilterEvent>(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("⚠️ Ignoring invalid filter event: {}", e);
                return None;
            }
        };

        self.criteria = self.criteria.apply(event);

        match self.render().await {
            Ok(outputs) => Some(outputs),
            Err(e) => {
                error!("❌ Render failed, waiting for the next event: {}", e);
                None
            }
        }
    }
}
