//! Server counters reported by a cache backend.

use std::collections::HashMap;

use serde::Serialize;

/// Raw counters read from the cache server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub version: String,
    pub uptime_secs: u64,
    pub keyspace_hits: u64,
    pub keyspace_misses: u64,
    pub expired_keys: u64,
    pub evicted_keys: u64,
    pub used_memory: u64,
    pub used_memory_peak: u64,
    pub connected_clients: u64,
    pub total_commands_processed: u64,
}

impl ServerInfo {
    /// Builds counters from the text returned by the Redis `INFO` command.
    ///
    /// Section headers and blank lines are skipped. Missing or unparsable
    /// numeric fields read as zero.
    pub fn from_redis_info(raw: &str) -> Self {
        let fields: HashMap<&str, &str> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once(':'))
            .collect();

        let number = |name: &str| {
            fields
                .get(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0)
        };

        Self {
            version: fields
                .get("redis_version")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            uptime_secs: number("uptime_in_seconds"),
            keyspace_hits: number("keyspace_hits"),
            keyspace_misses: number("keyspace_misses"),
            expired_keys: number("expired_keys"),
            evicted_keys: number("evicted_keys"),
            used_memory: number("used_memory"),
            used_memory_peak: number("used_memory_peak"),
            connected_clients: number("connected_clients"),
            total_commands_processed: number("total_commands_processed"),
        }
    }
}

/// Formats a byte count the way Redis prints `used_memory_human`.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1 << 30, "G"), (1 << 20, "M"), (1 << 10, "K")];

    for (size, suffix) in UNITS {
        if bytes >= size {
            return format!("{:.2}{}", bytes as f64 / size as f64, suffix);
        }
    }
    format!("{}B", bytes)
}

/// Formats an uptime as `2d 3h 4m`, dropping leading zero units.
pub fn human_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_INFO: &str = "# Server\r\n\
        redis_version:7.2.4\r\n\
        uptime_in_seconds:93784\r\n\
        \r\n\
        # Clients\r\n\
        connected_clients:3\r\n\
        \r\n\
        # Memory\r\n\
        used_memory:1048576\r\n\
        used_memory_human:1.00M\r\n\
        used_memory_peak:2097152\r\n\
        \r\n\
        # Stats\r\n\
        total_commands_processed:420\r\n\
        expired_keys:7\r\n\
        evicted_keys:2\r\n\
        keyspace_hits:90\r\n\
        keyspace_misses:10\r\n";

    #[test]
    fn test_parse_redis_info() {
        let info = ServerInfo::from_redis_info(SAMPLE_INFO);
        assert_eq!(info.version, "7.2.4");
        assert_eq!(info.uptime_secs, 93_784);
        assert_eq!(info.connected_clients, 3);
        assert_eq!(info.used_memory, 1_048_576);
        assert_eq!(info.used_memory_peak, 2_097_152);
        assert_eq!(info.total_commands_processed, 420);
        assert_eq!(info.keyspace_hits, 90);
        assert_eq!(info.keyspace_misses, 10);
        assert_eq!(info.expired_keys, 7);
        assert_eq!(info.evicted_keys, 2);
    }

    #[test]
    fn test_parse_missing_fields_default_to_zero() {
        let info = ServerInfo::from_redis_info("# Server\nredis_version:6.0.0\n");
        assert_eq!(info.version, "6.0.0");
        assert_eq!(info.keyspace_hits, 0);
        assert_eq!(info.used_memory, 0);
    }

    #[test]
    fn test_parse_empty_info() {
        let info = ServerInfo::from_redis_info("");
        assert_eq!(info.version, "unknown");
        assert_eq!(info.total_commands_processed, 0);
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512B");
        assert_eq!(human_bytes(1536), "1.50K");
        assert_eq!(human_bytes(2 * 1024 * 1024), "2.00M");
        assert_eq!(human_bytes(1 << 30), "1.00G");
    }

    #[test]
    fn test_human_uptime() {
        assert_eq!(human_uptime(42), "42s");
        assert_eq!(human_uptime(125), "2m");
        assert_eq!(human_uptime(3_660), "1h 1m");
        assert_eq!(human_uptime(93_784), "1d 2h 3m");
    }
}
