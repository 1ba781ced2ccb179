use askama::Template;
use askama_web::WebTemplate;

pub struct SatelliteLink {
    pub name: String,
    pub href: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub source: String,
    pub cache_state: String,
    pub satellites: Vec<SatelliteLink>,
    pub error: Option<String>,
}
