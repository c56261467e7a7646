//! Printable Anugya-Patra layout.
//!
//! The permit prints on a fixed bilingual template: a Hindi banner naming the
//! mandi committee and district, one labelled row per form field, and the
//! portal footer. [`PermitPreview`] holds that layout as plain data so a host
//! can hand it to whatever renderer it has (HTML, PDF). Its `Display` impl
//! gives a plain-text rendering.

use std::fmt;

use chrono::NaiveDate;

use crate::model::{Document, PermitFields};

const DEFAULT_MARKET_PLACE: &str = "Dabra";
const DEFAULT_MARKET_DISTRICT: &str = "Gwalior";
const PORTAL_URL: &str = "https://eanugya.mp.gov.in/Trader.aspx";
const PAGE_COUNTER: &str = "1/1";

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermitPreview {
    pub title: String,
    pub banner: Vec<String>,
    pub rows: Vec<PreviewRow>,
    pub footer: Vec<String>,
}

impl PermitPreview {
    pub fn build(document: &Document) -> Self {
        let fields = &document.fields;
        let market_place = non_empty_or(&fields.market_place, DEFAULT_MARKET_PLACE);
        let district = non_empty_or(&fields.market_district, DEFAULT_MARKET_DISTRICT);

        let banner = vec![
            "मूल प्रति".to_string(),
            "\"केवल राज्य के बाहर उपयोग हेतु\"".to_string(),
            "अनुज्ञा-पत्र".to_string(),
            format!("कृषि उपज मंडी समिति - {market_place}"),
            format!("जिला - {district}"),
            "अधिनियम की धारा-19(6) तथा उपविधि 20(10)".to_string(),
            "(मूल मंडी क्षेत्र अथवा मंडी प्रांगण से माल बाहर ले जाने के लिये)".to_string(),
        ];

        let rows = field_rows(fields)
            .into_iter()
            .map(|(hindi, english, value)| PreviewRow {
                label: format!("{hindi} ({english})"),
                value,
            })
            .collect();

        Self {
            title: fields.title.clone(),
            banner,
            rows,
            footer: vec![PORTAL_URL.to_string(), PAGE_COUNTER.to_string()],
        }
    }

    pub fn value_of(&self, english_label: &str) -> Option<&str> {
        let suffix = format!("({english_label})");
        self.rows
            .iter()
            .find(|row| row.label.ends_with(&suffix))
            .map(|row| row.value.as_str())
    }
}

impl fmt::Display for PermitPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Anugya-Patra: {}", self.title)?;
        for line in &self.banner {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        for row in &self.rows {
            let value = if row.value.is_empty() { "-" } else { row.value.as_str() };
            writeln!(f, "{}: {}", row.label, value)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.footer.join("    "))
    }
}

/// `2024-01-15` -> `January 15, 2024`. Anything that is not an ISO date
/// (or an RFC 3339 timestamp) comes back unchanged.
pub fn format_display_date(value: &str) -> String {
    let date_part = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%B %d, %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn quantity(value: f64) -> String {
    format!("{value}")
}

fn field_rows(f: &PermitFields) -> Vec<(&'static str, &'static str, String)> {
    vec![
        ("अनुज्ञा-पत्र क्रमांक", "Permit Number", f.permit_number.clone()),
        ("कृषि उपज का नाम", "Crop Name", f.crop_name.clone()),
        ("वाहन का प्रकार", "Vehicle Type", f.vehicle_type.clone()),
        ("वाहन क्रमांक", "Vehicle Number", f.vehicle_number.clone()),
        ("वाहन चालक का नाम", "Driver Name", f.driver_name.clone()),
        ("तौल कांटा का नाम एवं स्थान", "Weighing Station", f.weighing_station.clone()),
        ("तौल कांटा पर्ची नम्बर", "Weighing Slip Number", f.weighing_slip_number.clone()),
        ("मिल कवालिटी", "Mill Quality", f.mill_quality.clone()),
        ("कृषि उपज की मात्रा नग संख्या", "Crop Quantity Units", quantity(f.crop_quantity_units)),
        ("कुल वजन (क्विंटल में)", "Total Weight in Quintals", quantity(f.total_weight)),
        ("कृषि उपज के स्वामी / विक्रेता का नाम", "Owner/Seller Name", f.owner_name.clone()),
        ("अनुज्ञप्ति क्रमांक", "License Number", f.license_number.clone()),
        ("मान नंबर", "Man Number", f.man_number.clone()),
        ("कृषि उपज का विवरण", "Crop Details", f.crop_details.clone()),
        ("क्रय दिनांक", "Purchase Date", f.purchase_date.clone()),
        ("कुल क्रय मात्रा (क्विंटल में)", "Total Purchase Quantity", quantity(f.total_purchase_quantity)),
        ("कुल लाई गई मात्रा", "Total Brought Quantity", quantity(f.total_brought_quantity)),
        ("वापिस ले जायी गई मात्रा", "Returned Quantity", quantity(f.returned_quantity)),
        ("वापिस ले जाने का कारण", "Return Reason", f.return_reason.clone()),
        (
            "व्यापारी के पास इस अनुज्ञापत्र से निकासी के बाद शेष स्कंध वजन (क्विंटल में)",
            "Remaining Stock Weight",
            quantity(f.remaining_stock_weight),
        ),
        ("क्रेता व्यापारी / फर्म / स्थान", "Buyer/Trader Name", f.buyer_trader_name.clone()),
        ("मान नंबर", "Buyer Man Number", f.buyer_man_number.clone()),
        ("मंडी समिति", "Market Committee", f.market_committee.clone()),
        ("जी.एस.टी. पंजीयन क्रमांक", "GST Number", f.gst_number.clone()),
        ("मंडी समिति का जिला", "Market District", f.market_district.clone()),
        ("स्थान", "Market Place", f.market_place.clone()),
        ("जारी करने का दिनांक", "Issue Date", f.issue_date.clone()),
        ("जारी करने का समय", "Issue Time", f.issue_time.clone()),
        ("प्रिंट दिनांक", "Print Date", f.print_date.clone()),
        ("प्रिंट समय", "Print Time", f.print_time.clone()),
        ("नाम", "Name", f.name.clone()),
        ("पता", "Address", f.address.clone()),
        ("तारीख", "Date", format_display_date(&f.date)),
        ("सामग्री", "Content", f.content.clone()),
    ]
}
