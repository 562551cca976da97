//! Synthetic reader whose whole "file" is its id.
//!
//! An id looks like `name&sizeZ=3&sizeC=2&sizeT=4&dimOrder=XYZCT.fake`. No
//! file is ever touched. Every sample value is derived from the series,
//! plane, sub-channel and position, so pixel data can be checked exactly:
//! see [`fake_sample`].
//!
//! Recognised keys:
//!
//! | key           | default  | meaning                                   |
//! |---------------|----------|-------------------------------------------|
//! | `sizeX`       | 512      | plane width                               |
//! | `sizeY`       | 512      | plane height                              |
//! | `sizeZ`       | 1        | focal planes                              |
//! | `sizeC`       | 1        | channels, including RGB sub-channels      |
//! | `sizeT`       | 1        | time points                               |
//! | `pixelType`   | `uint8`  | sample encoding                           |
//! | `rgb`         | 1        | sub-channels stored in one plane          |
//! | `dimOrder`    | `XYZCT`  | plane order                               |
//! | `series`      | 1        | number of identical series                |
//! | `little`      | `true`   | byte order of multi-byte samples          |
//! | `interleaved` | `false`  | sub-channel layout within a plane         |
//! | `indexed`     | `false`  | provide a lookup table                    |
//! | `falseColor`  | `false`  | the lookup table is only a display aid    |

use std::str::FromStr;

use crate::error::{FormatError, Result};
use crate::model::{CoreMetadata, DimensionOrder, PixelType, Region};
use crate::reader::{BaseReader, FormatBackend, LookupTable, ParseContext, ReaderState};

/// A [`FormatReader`](crate::FormatReader) for `.fake` ids.
pub type FakeReader = BaseReader<FakeFormat>;

/// Value of the sample at (`x`, `y`) of sub-channel `sub_c` in plane `no`
/// of `series`, before truncation to the pixel type.
pub fn fake_sample(series: usize, no: usize, sub_c: usize, x: usize, y: usize) -> u64 {
    let [series, no, sub_c, x, y] = [series, no, sub_c, x, y].map(|v| v as u64);
    x.wrapping_add(y)
        .wrapping_add(sub_c.wrapping_mul(16))
        .wrapping_add(no.wrapping_mul(32))
        .wrapping_add(series.wrapping_mul(64))
}

/// Backend of [`FakeReader`]. Stateless: everything is in the id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeFormat;

impl FormatBackend for FakeFormat {
    fn name(&self) -> &'static str {
        "Simulated data"
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &["fake"]
    }

    fn is_this_type_bytes(&self, _block: &[u8]) -> bool {
        false
    }

    fn parse(&mut self, id: &str, ctx: &mut ParseContext<'_>) -> Result<()> {
        let spec = FakeSpec::parse(id)?;

        for (key, value) in &spec.entries {
            ctx.add_meta(key, value.as_str());
        }

        for index in 0..spec.series {
            let name = if spec.series == 1 {
                spec.name.clone()
            } else {
                format!("{} #{}", spec.name, index + 1)
            };
            ctx.add_series(name, spec.core());
            ctx.status(index + 1, spec.series, format!("Series {}", index + 1));
        }
        Ok(())
    }

    fn read_region(
        &mut self,
        state: &ReaderState,
        no: usize,
        buf: &mut [u8],
        region: Region,
    ) -> Result<()> {
        let core = state.core();
        let channels = core.rgb_channel_count();
        let bpp = core.pixel_type.bytes_per_pixel();

        for sub_c in 0..channels {
            for row in 0..region.height {
                for col in 0..region.width {
                    let value = fake_sample(state.series(), no, sub_c, region.x + col, region.y + row);
                    let sample = if core.interleaved {
                        (row * region.width + col) * channels + sub_c
                    } else {
                        (sub_c * region.height + row) * region.width + col
                    };
                    let offset = sample * bpp;
                    write_sample(
                        &mut buf[offset..offset + bpp],
                        value,
                        core.pixel_type,
                        core.little_endian,
                    );
                }
            }
        }
        Ok(())
    }

    fn lut_8bit(&mut self, state: &ReaderState) -> Result<Option<LookupTable<u8>>> {
        if state.core().pixel_type != PixelType::Uint8 {
            return Ok(None);
        }
        let ramp: Vec<u8> = (0..=255u8).collect();
        let reversed: Vec<u8> = ramp.iter().rev().copied().collect();
        Ok(Some(vec![ramp.clone(), reversed, ramp]))
    }

    fn lut_16bit(&mut self, state: &ReaderState) -> Result<Option<LookupTable<u16>>> {
        if state.core().pixel_type != PixelType::Uint16 {
            return Ok(None);
        }
        let ramp: Vec<u16> = (0..=u16::MAX).collect();
        let reversed: Vec<u16> = ramp.iter().rev().copied().collect();
        Ok(Some(vec![ramp.clone(), reversed, ramp]))
    }
}

fn write_sample(out: &mut [u8], value: u64, pixel_type: PixelType, little_endian: bool) {
    match pixel_type {
        PixelType::Float => {
            let v = value as f32;
            out.copy_from_slice(&if little_endian { v.to_le_bytes() } else { v.to_be_bytes() });
        }
        PixelType::Double => {
            let v = value as f64;
            out.copy_from_slice(&if little_endian { v.to_le_bytes() } else { v.to_be_bytes() });
        }
        _ => {
            let width = out.len();
            if little_endian {
                out.copy_from_slice(&value.to_le_bytes()[..width]);
            } else {
                out.copy_from_slice(&value.to_be_bytes()[8 - width..]);
            }
        }
    }
}

// =============================================================================
// Id parsing
// =============================================================================

#[derive(Debug, Clone)]
struct FakeSpec {
    name: String,
    size_x: usize,
    size_y: usize,
    size_z: usize,
    size_c: usize,
    size_t: usize,
    pixel_type: PixelType,
    rgb: usize,
    image_count: usize,
    order: DimensionOrder,
    series: usize,
    little: bool,
    interleaved: bool,
    indexed: bool,
    false_color: bool,
    entries: Vec<(String, String)>,
}

impl Default for FakeSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            size_x: 512,
            size_y: 512,
            size_z: 1,
            size_c: 1,
            size_t: 1,
            pixel_type: PixelType::Uint8,
            rgb: 1,
            image_count: 1,
            order: DimensionOrder::XYZCT,
            series: 1,
            little: true,
            interleaved: false,
            indexed: false,
            false_color: false,
            entries: Vec::new(),
        }
    }
}

impl FakeSpec {
    fn parse(id: &str) -> Result<Self> {
        let invalid = |reason: String| FormatError::InvalidId {
            id: id.to_string(),
            reason,
        };

        let file = id.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(id);
        let stem = match file.rsplit_once('.') {
            Some((stem, ext)) if ext.eq_ignore_ascii_case("fake") => stem,
            _ => return Err(invalid("expected a .fake suffix".to_string()).into()),
        };

        let mut tokens = stem.split('&');
        let mut spec = FakeSpec {
            name: tokens.next().unwrap_or_default().to_string(),
            ..Default::default()
        };

        for token in tokens {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| invalid(format!("{token:?} is not key=value")))?;
            let count = || {
                value
                    .parse::<usize>()
                    .map_err(|_| invalid(format!("{key} must be a count, got {value:?}")))
            };
            let flag = || match value.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(invalid(format!("{key} must be true or false, got {value:?}"))),
            };

            match key {
                "sizeX" => spec.size_x = count()?,
                "sizeY" => spec.size_y = count()?,
                "sizeZ" => spec.size_z = count()?,
                "sizeC" => spec.size_c = count()?,
                "sizeT" => spec.size_t = count()?,
                "rgb" => spec.rgb = count()?,
                "series" => spec.series = count()?,
                "pixelType" => spec.pixel_type = PixelType::from_str(value)?,
                "dimOrder" => spec.order = DimensionOrder::from_str(value)?,
                "little" => spec.little = flag()?,
                "interleaved" => spec.interleaved = flag()?,
                "indexed" => spec.indexed = flag()?,
                "falseColor" => spec.false_color = flag()?,
                _ => return Err(invalid(format!("unknown key {key:?}")).into()),
            }
            spec.entries.push((key.to_string(), value.to_string()));
        }

        if spec.series == 0 {
            return Err(invalid("series must be at least 1".to_string()).into());
        }
        if spec.rgb == 0 || spec.size_c % spec.rgb != 0 {
            return Err(invalid(format!(
                "sizeC {} is not a multiple of rgb {}",
                spec.size_c, spec.rgb
            ))
            .into());
        }
        if spec.indexed && spec.rgb > 1 {
            return Err(invalid("indexed data cannot be RGB".to_string()).into());
        }
        spec.image_count = spec
            .size_z
            .checked_mul(spec.size_t)
            .and_then(|zt| zt.checked_mul(spec.size_c / spec.rgb))
            .ok_or_else(|| {
                invalid(format!(
                    "plane count {}*{}*{} overflows",
                    spec.size_z,
                    spec.size_t,
                    spec.size_c / spec.rgb
                ))
            })?;
        Ok(spec)
    }

    fn core(&self) -> CoreMetadata {
        CoreMetadata {
            size_x: self.size_x,
            size_y: self.size_y,
            size_z: self.size_z,
            size_c: self.size_c,
            size_t: self.size_t,
            pixel_type: self.pixel_type,
            image_count: self.image_count,
            dimension_order: self.order,
            rgb: self.rgb > 1,
            little_endian: self.little,
            interleaved: self.interleaved,
            indexed: self.indexed,
            false_color: self.false_color,
            ..Default::default()
        }
    }
}
