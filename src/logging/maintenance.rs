use super::{LoggingConfig, build_current_log_path};
use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// 一次日志维护的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// 删除的过期文件数
    pub removed: usize,
    /// 新压缩的历史文件数
    pub compressed: usize,
}

/// 执行一次日志维护
///
/// 确保当天日志文件存在, 删除早于 `retention_days` 天的日志,
/// `compress_history` 开启时把今天以前的 `.log` 压缩成 `.log.gz`.
/// 不属于 `file_prefix` 的文件不会被触碰.
pub fn run_maintenance(config: &LoggingConfig) -> Result<MaintenanceReport> {
    ensure_current_log_file(config)?;
    cleanup_logs(config, Local::now().date_naive())
}

fn ensure_current_log_file(config: &LoggingConfig) -> Result<()> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory)?;
    let today = Local::now().date_naive();
    let current_path = build_current_log_path(directory, &config.file_prefix, today);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&current_path)
        .with_context(|| format!("创建当前日志文件失败, path={}", current_path.display()))?;
    Ok(())
}

fn cleanup_logs(config: &LoggingConfig, today: NaiveDate) -> Result<MaintenanceReport> {
    let mut report = MaintenanceReport::default();
    let directory = Path::new(&config.directory);
    if !directory.exists() {
        return Ok(report);
    }

    let cutoff = today - ChronoDuration::days(config.retention_days);

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let file_path = entry.path();

        let Some((date, compressed)) = parse_rotated_log_name(&file_name, &config.file_prefix)
        else {
            continue;
        };

        if date < cutoff {
            if fs::remove_file(&file_path).is_ok() {
                report.removed += 1;
            }
            continue;
        }

        if config.compress_history && !compressed && date < today {
            match compress_to_gz(&file_path) {
                Ok(true) => report.compressed += 1,
                Ok(false) => {}
                Err(err) => tracing::warn!("压缩日志失败: {:#}", err),
            }
        }
    }

    Ok(report)
}

/// 压缩单个日志文件, 已存在同名 `.gz` 时跳过并返回 `false`
fn compress_to_gz(path: &Path) -> Result<bool> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    if gz_path.exists() {
        return Ok(false);
    }

    let mut input =
        File::open(path).with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?;
    let output = File::create(&gz_path)
        .with_context(|| format!("创建压缩日志失败, path={}", gz_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());

    let mut buf = [0u8; 8 * 1024];
    loop {
        let read = input.read(&mut buf)?;
        if read == 0 {
            break;
        }
        encoder.write_all(&buf[..read])?;
    }

    encoder.finish()?;
    fs::remove_file(path)
        .with_context(|| format!("删除已压缩日志失败, path={}", path.display()))?;
    Ok(true)
}

fn parse_rotated_log_name(file_name: &str, prefix: &str) -> Option<(NaiveDate, bool)> {
    let with_prefix = file_name.strip_prefix(prefix)?;
    let with_dot = with_prefix.strip_prefix('.')?;

    if let Some(date_part) = with_dot.strip_suffix(".log") {
        let date = parse_date(date_part)?;
        return Some((date, false));
    }

    if let Some(date_part) = with_dot.strip_suffix(".log.gz") {
        let date = parse_date(date_part)?;
        return Some((date, true));
    }

    None
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
