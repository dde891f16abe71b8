use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use log::{debug, error};

pub fn check_read_simple<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

/// 读取节点内容，最多 `max_len` 字节
pub fn read_node<P: AsRef<Path>>(path: P, max_len: usize) -> Result<String> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)
        .with_context(|| format!("Failed to open node for reading: {}", path_ref.display()))?;

    let mut raw = Vec::with_capacity(max_len);
    file.take(max_len as u64)
        .read_to_end(&mut raw)
        .with_context(|| format!("Failed to read from node: {}", path_ref.display()))?;

    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// 写入节点，内容超过 `max_len` 时截断
pub fn write_node<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
    max_len: usize,
) -> Result<usize> {
    let path_ref = path.as_ref();

    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path_ref)
        .with_context(|| format!("Failed to open node for writing: {}", path_ref.display()))?;

    let content_ref = content.as_ref();
    let len = std::cmp::min(content_ref.len(), max_len);
    file.write_all(&content_ref[..len])
        .with_context(|| format!("Failed to write to node: {}", path_ref.display()))?;

    Ok(len)
}

/// 节点不存在时跳过写入，写入失败只记录日志
pub fn write_node_safe<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
    max_len: usize,
) -> Result<usize> {
    let path_ref = path.as_ref();

    if !path_ref.exists() {
        debug!("Node does not exist, skip writing: {}", path_ref.display());
        return Ok(0);
    }

    match write_node(path_ref, content, max_len) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            error!("Write failed, continuing: {} - {:#}", path_ref.display(), e);
            Ok(0)
        }
    }
}
