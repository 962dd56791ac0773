use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DialectOptions {
    /// Delimiter character.
    pub delimiter: u8,
    /// Quote character.
    pub quote: u8,
}

impl Default for DialectOptions {
    fn default() -> Self {
        DialectOptions {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl fmt::Debug for DialectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectOptions")
            .field("delimiter", &(self.delimiter as char))
            .field("quote", &(self.quote as char))
            .finish()
    }
}

impl DialectOptions {
    /// Try to infer which csv options to use based on a sample from the
    /// beginning of a csv source.
    ///
    /// Anything after the last newline in the sample is ignored since it may
    /// be a partial record.
    pub fn infer_from_sample(sample_bytes: &[u8]) -> Option<Self> {
        let sample = match sample_bytes.iter().rposition(|&b| b == b'\n') {
            Some(idx) => &sample_bytes[..=idx],
            None => sample_bytes,
        };

        // Best dialect chosen so far alongside number of fields decoded.
        let mut best: (Option<Self>, usize) = (None, 0);

        for dialect in Self::dialects() {
            // To be considered the best dialect:
            //
            // - Should decode at least 2 records.
            // - Should parse at least 2 fields for a record.
            // - Should have decoded more number of fields than previous best.
            // - All decoded records have the same number of fields.
            let field_counts = match dialect.sample_field_counts(sample) {
                Some(counts) => counts,
                None => continue,
            };

            if field_counts.len() < 2 {
                continue;
            }

            let num_fields = field_counts[0];

            // Parsing a single field is trivial.
            if num_fields < 2 {
                continue;
            }

            // If we parse fewer fields, likely not what we want.
            if num_fields <= best.1 {
                continue;
            }

            // Make sure everything in our sample has the same number of
            // fields.
            if field_counts.iter().any(|&n| n != num_fields) {
                continue;
            }

            // New best dialect.
            best = (Some(*dialect), num_fields);
        }

        best.0
    }

    /// Reader builder configured for this dialect.
    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .flexible(true)
            .trim(csv::Trim::All);
        builder
    }

    /// Field counts of every record in the sample, or None if the sample
    /// can't be decoded with this dialect.
    fn sample_field_counts(&self, sample: &[u8]) -> Option<Vec<usize>> {
        let mut builder = self.reader_builder();
        builder.has_headers(false);
        let mut reader = builder.from_reader(sample);

        reader
            .byte_records()
            .map(|rec| rec.ok().map(|rec| rec.len()))
            .collect()
    }

    /// Dialects used when attempting to infer options for a csv file.
    ///
    /// These are order with preferred options first. For example, if we infer
    /// the dialects from a file containing only commas, we want to pick the
    /// dialect with the more standard quote character ('"').
    const fn dialects() -> &'static [Self] {
        &[
            DialectOptions {
                delimiter: b',',
                quote: b'"',
            },
            DialectOptions {
                delimiter: b'|',
                quote: b'"',
            },
            DialectOptions {
                delimiter: b';',
                quote: b'"',
            },
            DialectOptions {
                delimiter: b'\t',
                quote: b'"',
            },
            DialectOptions {
                delimiter: b',',
                quote: b'\'',
            },
            DialectOptions {
                delimiter: b'|',
                quote: b'\'',
            },
            DialectOptions {
                delimiter: b';',
                quote: b'\'',
            },
            DialectOptions {
                delimiter: b'\t',
                quote: b'\'',
            },
        ]
    }
}
