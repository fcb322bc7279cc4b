mod api;
mod health;

#[cfg(test)]
mod test_support;

macros_utils::routes! {
    route health::health_route,
    scope "/api" => api,
}
