//! Small declarative helpers shared by the HTTP apps.

/// Generates a `pub fn routes(cfg: &mut ServiceConfig)` registering every
/// listed handler, optionally followed by nested scopes whose modules expose
/// their own `routes` function.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     scope "/api" => api,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $route:path),* $(,)?) => {
        pub fn routes(cfg: &mut ::actix_web::web::ServiceConfig) {
            $(cfg.service($route);)*
        }
    };
    ($(route $route:path,)* $(scope $prefix:literal => $module:ident),+ $(,)?) => {
        pub fn routes(cfg: &mut ::actix_web::web::ServiceConfig) {
            $(cfg.service($route);)*
            $(cfg.service(::actix_web::web::scope($prefix).configure($module::routes));)+
        }
    };
}
