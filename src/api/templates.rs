use crate::dashboard::Dashboard;
use crate::error::Result;
use minijinja::{context, Environment};

/// HTML pages, compiled into the binary
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("master.html", include_str!("../../templates/master.html"))?;
        env.add_template("go.html", include_str!("../../templates/go.html"))?;
        Ok(Self { env })
    }

    /// Index page with the overview charts
    pub fn render_index(&self, dashboard: &Dashboard) -> Result<String> {
        let template = self.env.get_template("master.html")?;
        Ok(template.render(context! {
            graphs => &dashboard.graphs,
            ids => &dashboard.ids,
        })?)
    }

    /// Result page for one classified query
    pub fn render_go(&self, query: &str, classification_result: &[(String, u8)]) -> Result<String> {
        let template = self.env.get_template("go.html")?;
        Ok(template.render(context! {
            query => query,
            classification_result => classification_result,
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dataset;

    #[test]
    fn test_index_embeds_charts() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render_index(&Dashboard::build(&Dataset::default()))
            .unwrap();

        assert!(html.contains("id=\"graph-0\""));
        assert!(html.contains("Distribution of Message Genres"));
        assert!(html.contains("Plotly.newPlot"));
    }

    #[test]
    fn test_go_highlights_positive_categories() {
        let templates = Templates::new().unwrap();
        let results = vec![("aid_related".to_string(), 1), ("food".to_string(), 0)];
        let html = templates.render_go("<b>water</b>", &results).unwrap();

        assert!(html.contains("list-group-item-success text-center\">Aid Related"));
        assert!(html.contains("list-group-item-dark text-center\">Food"));
        // Query text is escaped
        assert!(html.contains("&lt;b&gt;water"));
        assert!(!html.contains("<b>water"));
        assert!(!html.contains("Plotly.newPlot"));
    }
}
