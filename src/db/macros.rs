/// Cache-aside helper over the Redis [`Cache`](crate::db::Cache).
///
/// Looks the key up first; on a miss, runs the block, stores the result via
/// the background writer, and returns it.
///
/// # Arguments
/// * `$cache`: a cache with `get_from_cache` and `set_in_background` methods.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) for the value.
/// * `$ttl`: time-to-live for the stored value in seconds.
/// * `$block`: async block computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let weather = cached!(cache, cache_key, WEATHER_CACHE_TTL, async move {
///     fetch_current_weather().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
