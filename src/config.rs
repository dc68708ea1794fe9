use anyhow::{Result, bail};

use crate::debugger::DebugLevel;

pub const DEFAULT_FRAMES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Number of frames in the pool. Fixed for the pool's lifetime.
    pub frames: usize,
    pub debug_level: DebugLevel,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAMES,
            debug_level: DebugLevel::Off,
        }
    }
}

impl BufferConfig {
    /// Reads `--frames=N` and `--debug=LEVEL`; anything else is left for the
    /// caller and returned.
    pub fn from_args<I, S>(args: I) -> Result<(Self, Vec<String>)>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = BufferConfig::default();
        let mut rest = Vec::new();

        for arg in args.into_iter().map(Into::into) {
            if let Some(v) = arg.strip_prefix("--frames=") {
                config.frames = v
                    .parse()
                    .map_err(|e| anyhow::anyhow!("bad --frames value '{}': {}", v, e))?;
            } else if let Some(v) = arg.strip_prefix("--debug=") {
                config.debug_level = v.parse().map_err(anyhow::Error::msg)?;
            } else {
                rest.push(arg);
            }
        }

        config.validate()?;
        Ok((config, rest))
    }

    pub fn validate(&self) -> Result<()> {
        if self.frames == 0 {
            bail!("buffer pool needs at least one frame");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_flags() {
        let (config, rest) = BufferConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config, BufferConfig::default());
        assert!(rest.is_empty());
    }

    #[test]
    fn parses_flags_and_keeps_the_rest() {
        let (config, rest) =
            BufferConfig::from_args(["--frames=8", "data.db", "--debug=trace"]).unwrap();
        assert_eq!(config.frames, 8);
        assert_eq!(config.debug_level, DebugLevel::Trace);
        assert_eq!(rest, vec!["data.db".to_string()]);
    }

    #[test]
    fn rejects_zero_frames() {
        assert!(BufferConfig::from_args(["--frames=0"]).is_err());
        assert!(BufferConfig::from_args(["--frames=many"]).is_err());
    }
}
