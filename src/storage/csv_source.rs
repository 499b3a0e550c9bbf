use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::core::{check_rating, Coordinates, Location, TourismLink};
use crate::error::{CatalogError, Result};

const COL_ID: &str = "ID";
const COL_NAME: &str = "Name";
const COL_DESCRIPTION: &str = "Description";
const COL_CITY: &str = "City";
const COL_COUNTRY: &str = "Country";
const COL_CATEGORY: &str = "Category";
const COL_LATITUDE: &str = "Latitude";
const COL_LONGITUDE: &str = "Longitude";
const COL_RATING: &str = "Rating";
const COL_PRICE_RANGE: &str = "Price Range";
const COL_IMAGE_URL: &str = "Image URL";
const COL_ADDRESS: &str = "Address";
const COL_OPENING_HOURS: &str = "Opening Hours";
const COL_TOURISM_LINKS: &str = "Tourism Links";

/// 表格数据源（带表头的 CSV）
///
/// 按表头名取列，列顺序无关。任一行解析失败即整体失败（上层负责回退为空目录）。
pub struct CsvSource;

impl CsvSource {
    pub fn read_path(path: &Path) -> Result<Vec<Location>> {
        let file = std::fs::File::open(path)?;
        Self::read_from(file)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Vec<Location>> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: HashMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();

        let mut out = Vec::new();
        for (i, rec) in reader.records().enumerate() {
            let rec = rec?;
            let row = Row {
                rec: &rec,
                headers: &headers,
                line: i + 1,
            };
            out.push(row.to_location()?);
        }
        Ok(out)
    }
}

struct Row<'a> {
    rec: &'a StringRecord,
    headers: &'a HashMap<String, usize>,
    line: usize,
}

impl Row<'_> {
    fn invalid(&self, reason: String) -> CatalogError {
        CatalogError::InvalidRow {
            row: self.line,
            reason,
        }
    }

    fn cell(&self, col: &str) -> Option<&str> {
        self.headers.get(col).and_then(|&i| self.rec.get(i))
    }

    fn required(&self, col: &str) -> Result<&str> {
        self.cell(col)
            .ok_or_else(|| self.invalid(format!("missing column {:?}", col)))
    }

    /// 缺列或空单元格都视为缺省
    fn optional(&self, col: &str) -> Option<String> {
        self.cell(col)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn parse_f64(&self, col: &str, raw: &str) -> Result<f64> {
        raw.trim()
            .parse::<f64>()
            .map_err(|e| self.invalid(format!("{} {:?}: {}", col, raw, e)))
    }

    fn to_location(&self) -> Result<Location> {
        let raw_id = self.required(COL_ID)?;
        let id = raw_id
            .trim()
            .parse::<u64>()
            .map_err(|e| self.invalid(format!("{} {:?}: {}", COL_ID, raw_id, e)))?;

        let latitude = self.parse_f64(COL_LATITUDE, self.required(COL_LATITUDE)?)?;
        let longitude = self.parse_f64(COL_LONGITUDE, self.required(COL_LONGITUDE)?)?;

        let rating = match self.optional(COL_RATING) {
            Some(raw) => {
                let r = self.parse_f64(COL_RATING, &raw)?;
                check_rating(r).map_err(|e| self.invalid(e.to_string()))?;
                Some(r)
            }
            None => None,
        };

        let tourism_links = self
            .optional(COL_TOURISM_LINKS)
            .map(|raw| parse_tourism_links(&raw))
            .unwrap_or_default();

        Ok(Location {
            id,
            name: self.required(COL_NAME)?.to_string(),
            description: self.required(COL_DESCRIPTION)?.to_string(),
            city: self.required(COL_CITY)?.to_string(),
            country: self.required(COL_COUNTRY)?.to_string(),
            coordinates: Coordinates {
                latitude,
                longitude,
            },
            category: self.required(COL_CATEGORY)?.to_lowercase(),
            rating,
            image_url: self.optional(COL_IMAGE_URL),
            tourism_links,
            address: self.optional(COL_ADDRESS),
            opening_hours: self.optional(COL_OPENING_HOURS),
            price_range: self.optional(COL_PRICE_RANGE),
        })
    }
}

/// `Title: URL|Title: URL`，按第一个 ':' 切分（URL 自身的 scheme 冒号保留）
pub fn parse_tourism_links(raw: &str) -> Vec<TourismLink> {
    raw.split('|')
        .filter_map(|part| {
            let (title, url) = part.split_once(':')?;
            let title = title.trim();
            Some(TourismLink {
                title: title.to_string(),
                url: url.trim().to_string(),
                description: Some(format!("Visit {}", title)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ID,Name,Description,City,Country,Category,Latitude,Longitude,Rating,Price Range,Image URL,Address,Opening Hours,Tourism Links";

    #[test]
    fn tourism_links_split_on_first_colon() {
        let links =
            parse_tourism_links("Official Site: https://a.example|no colon here| Guide :http://b.example/x");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].title, "Official Site");
        assert_eq!(links[0].url, "https://a.example");
        assert_eq!(links[0].description.as_deref(), Some("Visit Official Site"));
        assert_eq!(links[1].title, "Guide");
        assert_eq!(links[1].url, "http://b.example/x");
    }

    #[test]
    fn reads_rows_and_lowercases_category() {
        let data = format!(
            "{}\n1,Government Museum,Old museum,Chennai,India,Museum,13.07,80.25,4.5,$,http://img/1.jpg,Egmore,9-5,Site: https://gm.example\n\
             2,Guindy Park,Park,Chennai,India,PARK,13.0,80.2,,,,,,\n",
            HEADER
        );
        let rows = CsvSource::read_from(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].category, "museum");
        assert_eq!(rows[0].rating, Some(4.5));
        assert_eq!(rows[0].price_range.as_deref(), Some("$"));
        assert_eq!(rows[0].tourism_links.len(), 1);

        assert_eq!(rows[1].category, "park");
        assert_eq!(rows[1].rating, None);
        assert_eq!(rows[1].image_url, None);
        assert!(rows[1].tourism_links.is_empty());
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let data = "ID,Name,Description,City,Country,Category,Latitude,Longitude\n\
                    5,Eiffel Tower,Tower,Paris,France,Monument,48.85,2.29\n";
        let rows = CsvSource::read_from(data.as_bytes()).unwrap();
        assert_eq!(rows[0].id, 5);
        assert_eq!(rows[0].address, None);
    }

    #[test]
    fn bad_number_fails_with_row_number() {
        let data = format!(
            "{}\n1,A,B,Paris,France,museum,1.0,2.0,,,,,,\n2,A,B,Paris,France,museum,north,2.0,,,,,,\n",
            HEADER
        );
        match CsvSource::read_from(data.as_bytes()) {
            Err(CatalogError::InvalidRow { row, .. }) => assert_eq!(row, 2),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn rating_out_of_range_fails() {
        let data = format!("{}\n1,A,B,Paris,France,museum,1.0,2.0,7.5,,,,,\n", HEADER);
        assert!(CsvSource::read_from(data.as_bytes()).is_err());
    }

    #[test]
    fn missing_required_column_fails() {
        let data = "ID,Name,City,Country,Category,Latitude,Longitude\n1,A,Paris,France,museum,1.0,2.0\n";
        assert!(matches!(
            CsvSource::read_from(data.as_bytes()),
            Err(CatalogError::InvalidRow { .. })
        ));
    }
}
