//! 输入字节源.
//!
//! 点迹工具只做单遍前向扫描, 因此这里不提供 seek:
//! 探测所需的"回看"通过前缀回推 (push-back) 实现, 标准输入同样适用.

use std::io::Read;

use dian_core::{DianError, DianResult};

/// 默认读缓冲区大小 (32 KB)
const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// 前向字节源
///
/// 封装底层 `Read`, 提供带缓冲的逐字节读取. 输入耗尽时返回
/// `DianError::Eof`.
pub struct ByteSource {
    /// 底层读取器
    inner: Box<dyn Read + Send>,
    /// 回推的前缀字节 (探测时读出的开头数据)
    prefix: Vec<u8>,
    /// 前缀当前读取位置
    prefix_pos: usize,
    /// 读缓冲区
    buffer: Vec<u8>,
    /// 缓冲区中的有效数据长度
    buf_len: usize,
    /// 缓冲区当前读取位置
    buf_pos: usize,
}

impl ByteSource {
    /// 从底层读取器创建字节源
    pub fn new(inner: Box<dyn Read + Send>) -> Self {
        Self {
            inner,
            prefix: Vec::new(),
            prefix_pos: 0,
            buffer: vec![0u8; DEFAULT_BUFFER_SIZE],
            buf_len: 0,
            buf_pos: 0,
        }
    }

    /// 从文件路径打开 (只读)
    pub fn open_file(path: &str) -> DianResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// 从标准输入打开
    pub fn open_stdin() -> Self {
        Self::new(Box::new(std::io::stdin()))
    }

    /// 从内存缓冲区创建 (测试用)
    pub fn from_data(data: Vec<u8>) -> Self {
        Self::new(Box::new(std::io::Cursor::new(data)))
    }

    /// 读出最多 `n` 个开头字节用于探测, 随后这些字节仍会按序返回.
    ///
    /// 输入短于 `n` 时返回实际读到的部分. 只能在任何读取发生前调用.
    pub fn probe_prefix(&mut self, n: usize) -> DianResult<&[u8]> {
        debug_assert!(self.prefix.is_empty() && self.buf_len == 0);

        let mut prefix = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            let got = self.inner.read(&mut prefix[filled..])?;
            if got == 0 {
                break;
            }
            filled += got;
        }
        prefix.truncate(filled);
        self.prefix = prefix;
        self.prefix_pos = 0;
        Ok(&self.prefix)
    }

    /// 读取 1 个字节
    pub fn read_u8(&mut self) -> DianResult<u8> {
        // 先消耗回推的前缀
        if self.prefix_pos < self.prefix.len() {
            let b = self.prefix[self.prefix_pos];
            self.prefix_pos += 1;
            return Ok(b);
        }

        if self.buf_pos >= self.buf_len {
            self.buf_pos = 0;
            self.buf_len = self.inner.read(&mut self.buffer)?;
            if self.buf_len == 0 {
                return Err(DianError::Eof);
            }
        }

        let b = self.buffer[self.buf_pos];
        self.buf_pos += 1;
        Ok(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_逐字节读取() {
        let mut src = ByteSource::from_data(vec![0x01, 0x02, 0x03]);
        assert_eq!(src.read_u8().unwrap(), 0x01);
        assert_eq!(src.read_u8().unwrap(), 0x02);
        assert_eq!(src.read_u8().unwrap(), 0x03);
        assert!(matches!(src.read_u8(), Err(DianError::Eof)));
    }

    #[test]
    fn test_探测前缀不消耗数据() {
        let mut src = ByteSource::from_data(vec![0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(src.probe_prefix(3).unwrap(), &[0xAA, 0xBB, 0xCC]);

        // 探测过的字节仍按序读出
        assert_eq!(src.read_u8().unwrap(), 0xAA);
        assert_eq!(src.read_u8().unwrap(), 0xBB);
        assert_eq!(src.read_u8().unwrap(), 0xCC);
        assert_eq!(src.read_u8().unwrap(), 0xDD);
        assert!(matches!(src.read_u8(), Err(DianError::Eof)));
    }

    #[test]
    fn test_探测前缀短输入() {
        let mut src = ByteSource::from_data(vec![0x01, 0x02]);
        assert_eq!(src.probe_prefix(16).unwrap(), &[0x01, 0x02]);
        assert_eq!(src.read_u8().unwrap(), 0x01);
        assert_eq!(src.read_u8().unwrap(), 0x02);
        assert!(matches!(src.read_u8(), Err(DianError::Eof)));
    }
}
