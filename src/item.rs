use std::io::BufRead;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub text: Vec<u8>,
    /// Set once the item has been printed in multi-accept mode.
    pub out: bool,
}

impl Item {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self {
            text: text.into(),
            out: false,
        }
    }
}

/// Read newline-terminated items until end of input.
///
/// A read error ends loading the same way end-of-stream does; whatever was
/// read up to that point is kept.
pub fn read_items<R: BufRead>(mut reader: R) -> Vec<Item> {
    let mut items = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                items.push(Item::new(line.as_slice()));
            }
            Err(err) => {
                log::warn!("stopped reading items after {}: {}", items.len(), err);
                break;
            }
        }
    }
    log::info!("loaded {} items", items.len());
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{self, BufReader, Read};

    fn texts(items: &[Item]) -> Vec<&[u8]> {
        items.iter().map(|item| item.text.as_slice()).collect()
    }

    #[test]
    fn strips_trailing_newline_only() {
        let items = read_items(&b"alpha\n beta \n\ngamma"[..]);
        assert_eq!(
            texts(&items),
            vec![&b"alpha"[..], b" beta ", b"", b"gamma"]
        );
        assert!(items.iter().all(|item| !item.out));
    }

    #[test]
    fn keeps_invalid_utf8_bytes() {
        let items = read_items(&b"ok\n\xff\xfe\n"[..]);
        assert_eq!(texts(&items), vec![&b"ok"[..], b"\xff\xfe"]);
    }

    struct FailAfter<'a> {
        data: &'a [u8],
    }

    impl Read for FailAfter<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "pipe closed"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_error_ends_loading_like_eof() {
        let reader = BufReader::new(FailAfter {
            data: b"one\ntwo\n",
        });
        let items = read_items(reader);
        assert_eq!(texts(&items), vec![&b"one"[..], b"two"]);
    }
}
