use axum::response::Html;

/// Landing page listing the available routes
#[tracing::instrument]
pub async fn index() -> Html<&'static str> {
    Html(concat!(
        "Welcome to the Hawaii Climate Analysis API!<br/>",
        "Available Routes:<br/>",
        "/api/v1.0/precipitation<br/>",
        "/api/v1.0/stations<br/>",
        "/api/v1.0/tobs<br/>",
        "/api/v1.0/&lt;start&gt;<br/>",
        "/api/v1.0/&lt;start&gt;/&lt;end&gt;",
    ))
}
