//! Lua script sources for the scored-set backend.
//!
//! Both updates are read-modify-write cycles that must execute as a single
//! server-side step; plain get-then-set would lose concurrent updates for
//! the same key. `redis::Script` handles EVALSHA caching and reload, so the
//! sources are instantiated once per store and reused process-wide.

/// Atomic interest update with per-write decay.
///
/// KEYS[1] = interests:{device_id}
/// ARGV[1] = dimension field, ARGV[2] = decay factor, ARGV[3] = points
///
/// Scores that decay-and-add to zero or below are deleted rather than
/// stored; interest hashes only ever hold positive scores.
pub const UPDATE_INTEREST: &str = r#"
local current = redis.call('HGET', KEYS[1], ARGV[1])
local score
if current then
    score = tonumber(current) * tonumber(ARGV[2]) + tonumber(ARGV[3])
else
    score = tonumber(ARGV[3])
end
if score <= 0 then
    redis.call('HDEL', KEYS[1], ARGV[1])
else
    redis.call('HSET', KEYS[1], ARGV[1], tostring(score))
end
return tostring(score)
"#;

/// Multiplicative decay over the whole trending set, evicting members whose
/// decayed score falls below 0.01.
///
/// KEYS[1] = trending sorted set
/// ARGV[1] = decay factor
pub const DECAY_TRENDING: &str = r#"
local entries = redis.call('ZRANGE', KEYS[1], 0, -1, 'WITHSCORES')
for i = 1, #entries, 2 do
    local decayed = tonumber(entries[i + 1]) * tonumber(ARGV[1])
    if decayed < 0.01 then
        redis.call('ZREM', KEYS[1], entries[i])
    else
        redis.call('ZADD', KEYS[1], decayed, entries[i])
    end
end
return #entries / 2
"#;
