/// Read-through caching over the Redis `Cache`.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues
/// the result for a background write with `$ttl` seconds, and returns it.
/// A failing cache read is logged and treated as a miss, so Redis outages
/// only cost latency.
///
/// # Example
/// ```rust,ignore
/// let movie: AppResult<Movie> = cached!(cache, CacheKey::MovieDetails(id), 3600, async move {
///     fetch_movie(&id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                None
            }
        };

        match hit {
            Some(cached) => Ok(cached),
            None => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
