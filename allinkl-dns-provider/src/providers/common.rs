//! Provider 公共工具函数

use std::time::Duration;

use reqwest::Client;

// ============ HTTP Client ============

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
///
/// 构建失败（TLS 后端初始化失败）时退回默认 Client。
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Failed to build configured HTTP client, using defaults: {e}");
            Client::new()
        })
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

/// 区域的完全限定形式（末尾带点）
/// 如: "example.com" -> "example.com."
pub fn fqdn(zone: &str) -> String {
    format!("{}.", normalize_domain_name(zone))
}

/// 将完整域名转换为相对名称
/// 如: "www.example.com" + "example.com" -> "www"
/// 如: "example.com" + "example.com" -> "@"
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    let suffix = format!(".{}", zone.to_ascii_lowercase());

    if full.eq_ignore_ascii_case(&zone) {
        "@".to_string()
    } else if full.to_ascii_lowercase().ends_with(&suffix) {
        full[..full.len() - suffix.len()].to_string()
    } else {
        full
    }
}

/// 规范化调用方给出的记录名称
/// 如: "" / "@" -> "@"
/// 如: "www.example.com." + "example.com" -> "www"
/// 如: "www" -> "www"
pub fn relative_name(name: &str, zone_name: &str) -> String {
    let name = name.trim();
    if name.is_empty() || name == "@" {
        "@".to_string()
    } else if name.ends_with('.') {
        full_name_to_relative(name, zone_name)
    } else {
        name.to_string()
    }
}

/// 将相对名称转换为完整域名
/// 如: "www" + "example.com" -> "www.example.com"
/// 如: "@" + "example.com" -> "example.com"
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);

    if relative_name == "@" || relative_name.is_empty() {
        zone
    } else {
        format!("{relative_name}.{zone}")
    }
}
