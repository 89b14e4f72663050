use crate::areas::viewer::Viewer;
use colored::Colorize;

impl Viewer {
    /// Print the root commits in listing order, then whether the listing
    /// was already in topological order
    pub fn roots(&self) -> anyhow::Result<()> {
        let graph = self.history().graph();

        for id in graph.roots() {
            let description = graph.get(id).map_or("", |node| node.short_description());
            writeln!(self.writer(), "{} {}", id.to_string().yellow(), description)?;
        }

        let order = if graph.is_topological() {
            "topological"
        } else {
            "not topological"
        };
        writeln!(self.writer(), "listing order: {order}")?;

        Ok(())
    }
}
