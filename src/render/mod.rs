// Renderers over the joined table: choropleth map, charts, styled table,
// and the HTML page that puts them together. Markup lives in askama
// templates under `templates/`.

pub mod charts;
pub mod map;
pub mod page;
pub mod palette;
pub mod table;
