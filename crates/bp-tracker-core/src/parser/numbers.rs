//! Spoken number words → digits.
//!
//! Handles plain counts ("seventy two"), explicit hundreds ("one hundred and
//! thirty five") and the clipped way readings are usually spoken
//! ("one twenty" = 120, "one thirty five" = 135).

use std::collections::HashMap;

/// Place of a number word, which decides what may follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    Ones,
    Teen,
    Tens,
    Hundred,
}

/// Number being assembled from consecutive words.
#[derive(Debug, Clone, Copy)]
struct Partial {
    value: u32,
    last: Place,
}

impl Partial {
    /// Try to extend with the next word. `None` means the word starts a new number.
    fn extend(self, value: u32, place: Place) -> Option<Partial> {
        match (self.last, place) {
            // "one hundred", "a hundred"
            (Place::Ones, Place::Hundred) if self.value < 10 => Some(Partial {
                value: self.value.max(1) * 100,
                last: Place::Hundred,
            }),
            // "one twenty", "one fifteen"
            (Place::Ones, Place::Tens | Place::Teen) if self.value > 0 && self.value < 10 => {
                Some(Partial {
                    value: self.value * 100 + value,
                    last: place,
                })
            }
            // "hundred five", "hundred twelve", "hundred thirty"
            (Place::Hundred, Place::Ones | Place::Teen | Place::Tens) => Some(Partial {
                value: self.value + value,
                last: place,
            }),
            // "seventy two", "one twenty five"
            (Place::Tens, Place::Ones) if self.value % 10 == 0 && value > 0 => Some(Partial {
                value: self.value + value,
                last: Place::Ones,
            }),
            _ => None,
        }
    }
}

/// Converts number words in a lowercase utterance into digit tokens.
pub struct NumberWords {
    words: HashMap<String, (u32, Place)>,
}

impl Default for NumberWords {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberWords {
    pub fn new() -> Self {
        Self {
            words: Self::default_words(),
        }
    }

    /// Whether `word` is a number word.
    pub fn is_number_word(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Replace runs of number words with their numeric value.
    ///
    /// Non-number tokens pass through unchanged. Input is expected to be
    /// lowercase and whitespace separated.
    pub fn convert(&self, text: &str) -> String {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut out: Vec<String> = Vec::with_capacity(tokens.len());
        let mut current: Option<Partial> = None;

        for (i, token) in tokens.iter().enumerate() {
            let next = tokens.get(i + 1).copied();

            // "a hundred" is the only time "a" is a number
            let lookup = if *token == "a" && next == Some("hundred") {
                Some((1, Place::Ones))
            } else {
                self.words.get(*token).copied()
            };

            match lookup {
                Some((value, place)) => {
                    current = match current {
                        Some(partial) => match partial.extend(value, place) {
                            Some(extended) => Some(extended),
                            None => {
                                out.push(partial.value.to_string());
                                Some(Self::start(value, place))
                            }
                        },
                        None => Some(Self::start(value, place)),
                    };
                }
                None => {
                    // "one hundred and five"
                    let joins_hundred = *token == "and"
                        && matches!(current, Some(p) if p.last == Place::Hundred)
                        && next.is_some_and(|n| self.is_number_word(n));
                    if joins_hundred {
                        continue;
                    }

                    if let Some(partial) = current.take() {
                        out.push(partial.value.to_string());
                    }
                    out.push((*token).to_string());
                }
            }
        }

        if let Some(partial) = current {
            out.push(partial.value.to_string());
        }

        out.join(" ")
    }

    fn start(value: u32, place: Place) -> Partial {
        Partial { value, last: place }
    }

    fn default_words() -> HashMap<String, (u32, Place)> {
        let mut map = HashMap::new();

        let ones = [
            "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
        ];
        for (value, word) in ones.iter().enumerate() {
            map.insert((*word).into(), (value as u32, Place::Ones));
        }

        let teens = [
            "ten",
            "eleven",
            "twelve",
            "thirteen",
            "fourteen",
            "fifteen",
            "sixteen",
            "seventeen",
            "eighteen",
            "nineteen",
        ];
        for (offset, word) in teens.iter().enumerate() {
            map.insert((*word).into(), (10 + offset as u32, Place::Teen));
        }

        let tens = [
            ("twenty", 20),
            ("thirty", 30),
            ("forty", 40),
            ("fourty", 40),
            ("fifty", 50),
            ("sixty", 60),
            ("seventy", 70),
            ("eighty", 80),
            ("ninety", 90),
        ];
        for (word, value) in tens {
            map.insert(word.into(), (value, Place::Tens));
        }

        map.insert("hundred".into(), (100, Place::Hundred));

        map
    }
}
