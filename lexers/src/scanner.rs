#![deny(warnings)]

/// A buffered cursor over any iterator that supports arbitrary backtracking
/// up to the last `ignore`/`extract` call.
///
/// Items pulled from the source are kept in `buf` until the caller either
/// extracts them as a lexeme or drops them with `ignore`. Lexing helpers
/// record `pos()` before trying something and `set_pos` back on failure.
pub struct Scanner<I: Iterator> where I::Item: Clone {
    src: I,
    buf: Vec<I::Item>,
    // number of items of `buf` consumed so far
    pos: usize,
}

impl<I> Iterator for Scanner<I> where I: Iterator, I::Item: Clone {
    type Item = I::Item;
    fn next(&mut self) -> Option<Self::Item> {
        if !self.fill(self.pos + 1) {
            return None;
        }
        self.pos += 1;
        self.curr()
    }
}

impl<I> Scanner<I> where I: Iterator, I::Item: Clone {
    pub fn new(source: I) -> Scanner<I> {
        Scanner{src: source, buf: Vec::new(), pos: 0}
    }

    pub fn pos(&self) -> usize { self.pos }

    pub fn set_pos(&mut self, pos: usize) -> bool {
        if pos > self.buf.len() {
            return false;
        }
        self.pos = pos;
        true
    }

    /// Last consumed item, if any since the last `ignore`.
    pub fn curr(&self) -> Option<I::Item> {
        self.pos.checked_sub(1).and_then(|idx| self.buf.get(idx)).cloned()
    }

    // pull from the source until the buffer holds `len` items
    fn fill(&mut self, len: usize) -> bool {
        while self.buf.len() < len {
            match self.src.next() {
                Some(item) => self.buf.push(item),
                None => return false,
            }
        }
        true
    }

    pub fn prev(&mut self) -> Option<I::Item> {
        if self.pos > 0 { self.pos -= 1; }
        self.curr()
    }

    pub fn peek(&mut self) -> Option<I::Item> {
        self.peek_nth(0)
    }

    /// Look `n` items past the next one without consuming anything.
    pub fn peek_nth(&mut self, n: usize) -> Option<I::Item> {
        self.fill(self.pos + n + 1);
        self.buf.get(self.pos + n).cloned()
    }

    pub fn view(&self) -> &[I::Item] {
        &self.buf[..self.pos]
    }

    pub fn ignore(&mut self) {
        self.buf.drain(..self.pos);
        self.pos = 0;
    }

    pub fn extract(&mut self) -> Vec<I::Item> {
        let items = self.buf.drain(..self.pos).collect();
        self.pos = 0;
        items
    }

    /// Consume the next item only if `pred` holds for it.
    pub fn accept_if(&mut self, pred: impl Fn(&I::Item) -> bool) -> Option<I::Item> {
        match self.peek() {
            Some(next) if pred(&next) => self.next(),
            _ => None,
        }
    }

    /// Consume items while `pred` holds, returns whether the scanner advanced.
    pub fn advance_while(&mut self, pred: impl Fn(&I::Item) -> bool) -> bool {
        let start = self.pos;
        while self.accept_if(&pred).is_some() {}
        self.pos > start
    }
}


impl<I> Scanner<I> where I: Iterator, I::Item: Clone + PartialEq {
    pub fn accept(&mut self, what: &I::Item) -> Option<I::Item> {
        self.accept_if(|next| next == what)
    }

    pub fn accept_any(&mut self, any: &[I::Item]) -> Option<I::Item> {
        self.accept_if(|next| any.contains(next))
    }

    /// Accept the whole sequence or nothing at all.
    pub fn accept_seq(&mut self, seq: &[I::Item]) -> bool {
        let backtrack = self.pos();
        for item in seq {
            if self.accept(item).is_none() {
                self.set_pos(backtrack);
                return false;
            }
        }
        true
    }

    // Skip over the 'over' set, after skipping curr() is the last match
    pub fn skip_all(&mut self, over: &[I::Item]) -> bool {
        self.advance_while(|next| over.contains(next))
    }

    // Advance up to an element of the 'any' set or EOF, which isn't consumed
    pub fn until_any(&mut self, any: &[I::Item]) -> bool {
        self.advance_while(|next| !any.contains(next))
    }
}


/// Conveniences for character scanners, sets are given as `&str`.
impl<I: Iterator<Item=char>> Scanner<I> {
    pub fn extract_string(&mut self) -> String {
        self.extract().into_iter().collect()
    }

    pub fn accept_char(&mut self, c: char) -> bool {
        self.accept(&c).is_some()
    }

    pub fn accept_any_char(&mut self, any: &str) -> Option<char> {
        self.accept_if(|next| any.contains(*next))
    }

    pub fn accept_str(&mut self, word: &str) -> bool {
        let seq: Vec<char> = word.chars().collect();
        self.accept_seq(&seq)
    }

    pub fn skip_all_chars(&mut self, over: &str) -> bool {
        self.advance_while(|next| over.contains(*next))
    }

    pub fn until_any_char(&mut self, any: &str) -> bool {
        self.advance_while(|next| !any.contains(*next))
    }

    /// Skip horizontal whitespace (unicode blanks too), line breaks are left alone.
    pub fn skip_blanks(&mut self) -> bool {
        self.advance_while(|next| next.is_whitespace() && *next != '\n')
    }
}
