//! Kotlin object literal rendering.
//!
//! Plain string assembly: nothing here checks that the result compiles.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use super::EmitterConfig;
use crate::models::EnrichedRecord;
use crate::utils::kotlin_string_escape;

/// Lookup helpers appended after the collection, closing the object.
pub const HELPER_BLOCK: &str = r#"
    fun getAllPharmacies(): List<Pharmacy> = pharmacies

    fun getPharmaciesByCity(city: String): List<Pharmacy> {
        return pharmacies.filter { it.city.equals(city, ignoreCase = true) }
    }

    fun getPharmacyById(id: String): Pharmacy? = pharmacies.find { it.id == id }

    fun searchPharmacies(query: String): List<Pharmacy> {
        val lowerQuery = query.lowercase()
        return pharmacies.filter {
            it.name.lowercase().contains(lowerQuery) ||
            it.address.lowercase().contains(lowerQuery) ||
            it.phoneNumber.contains(query)
        }
    }

    fun getGeocodedPharmacies(): List<Pharmacy> = pharmacies.filter { it.geocoded }

    fun getNearbyPharmacies(latitude: Double, longitude: Double, radiusKm: Double = 5.0): List<Pharmacy> {
        return pharmacies
            .filter { it.geocoded }
            .map { it to calculateDistance(latitude, longitude, it.latitude, it.longitude) }
            .filter { (_, distance) -> distance <= radiusKm }
            .sortedBy { (_, distance) -> distance }
            .map { (pharmacy, _) -> pharmacy }
    }

    private fun calculateDistance(lat1: Double, lon1: Double, lat2: Double, lon2: Double): Double {
        val earthRadius = 6371.0
        val dLat = Math.toRadians(lat2 - lat1)
        val dLon = Math.toRadians(lon2 - lon1)
        val a = Math.sin(dLat / 2) * Math.sin(dLat / 2) +
                Math.cos(Math.toRadians(lat1)) * Math.cos(Math.toRadians(lat2)) *
                Math.sin(dLon / 2) * Math.sin(dLon / 2)
        val c = 2 * Math.atan2(Math.sqrt(a), Math.sqrt(1 - a))
        return earthRadius * c
    }
}
"#;

/// Render records as one Kotlin source file.
pub fn render_kotlin(
    records: &[EnrichedRecord],
    config: &EmitterConfig,
    generated_at: DateTime<Utc>,
) -> String {
    let geocoded = records.iter().filter(|r| r.geocoded).count();
    let percent = if records.is_empty() {
        0.0
    } else {
        geocoded as f64 * 100.0 / records.len() as f64
    };

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write!(
        out,
        "package {package}

import java.util.Date

/**
 * {object} - pharmacy directory data
 * Generated: {generated}
 * Total: {total} pharmacies
 * Geocoded: {geocoded} ({percent:.1}%)
 */
object {object} {{

    val pharmacies = listOf(
",
        package = config.package,
        object = config.object_name,
        generated = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        total = records.len(),
    );

    let entries: Vec<String> = records.iter().map(render_entry).collect();
    out.push_str(&entries.join(",\n"));
    if !entries.is_empty() {
        out.push('\n');
    }
    out.push_str("    )\n");
    out.push_str(HELPER_BLOCK);
    out
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", kotlin_string_escape(s))
}

fn render_entry(record: &EnrichedRecord) -> String {
    format!(
        "        Pharmacy(
            id = {id},
            name = {name},
            nameAr = null,
            address = {address},
            addressAr = null,
            city = {city},
            latitude = {lat:?},
            longitude = {lon:?},
            phoneNumber = {phone},
            email = null,
            website = null,
            openingHours = {hours},
            is24Hours = false,
            hasParking = false,
            isGuardPharmacy = false,
            rating = {rating:?}f,
            reviewCount = {reviews},
            imageUrl = null,
            services = emptyList(),
            distance = null,
            lastUpdated = Date({millis}L),
            geocoded = {geocoded}
        )",
        id = quoted(&record.id),
        name = quoted(&record.name),
        address = quoted(&record.address),
        city = quoted(&record.locality),
        lat = record.latitude,
        lon = record.longitude,
        phone = quoted(&record.phone),
        hours = quoted(&record.opening_hours_default),
        rating = record.rating.unwrap_or(0.0),
        reviews = record.review_count.unwrap_or(0),
        millis = record.last_updated.timestamp_millis(),
        geocoded = record.geocoded,
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::GeocodeStatus;

    fn record(id: &str, name: &str) -> EnrichedRecord {
        EnrichedRecord {
            id: id.to_string(),
            name: name.to_string(),
            address: format!("{}, Kénitra, Morocco", name),
            locality: "Kénitra".to_string(),
            latitude: 34.26,
            longitude: -6.58,
            phone: "05 37 00 00 00".to_string(),
            opening_hours_default: "Lun-Ven: 09:00-19:00".to_string(),
            geocoded: true,
            geocode_status: GeocodeStatus::Ok,
            last_updated: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            rating: Some(4.5),
            review_count: Some(12),
            place_id: None,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_header_and_entry_fields() {
        let out = render_kotlin(&[record("p_0001", "Pharmacie Atlas")], &EmitterConfig::default(), generated_at());

        assert!(out.starts_with("package com.pharmatech.morocco.features.pharmacy.domain.model\n"));
        assert!(out.contains(" * Generated: 2025-06-01T12:00:00Z\n"));
        assert!(out.contains(" * Total: 1 pharmacies\n"));
        assert!(out.contains(" * Geocoded: 1 (100.0%)\n"));
        assert!(out.contains("object KenitraPharmacyData {\n"));
        assert!(out.contains("            id = \"p_0001\",\n"));
        assert!(out.contains("            latitude = 34.26,\n"));
        assert!(out.contains("            longitude = -6.58,\n"));
        assert!(out.contains("            rating = 4.5f,\n"));
        assert!(out.contains("            reviewCount = 12,\n"));
        assert!(out.contains("            lastUpdated = Date(1735787045000L),\n"));
        assert!(out.contains("            geocoded = true\n"));
        assert!(out.ends_with(HELPER_BLOCK));
    }

    #[test]
    fn test_quotes_and_newlines_are_escaped() {
        let mut entry = record("p_0001", r#"Pharmacie "Centrale""#);
        entry.address = "Rue 1\nKénitra".to_string();
        let out = render_kotlin(&[entry], &EmitterConfig::default(), generated_at());

        assert!(out.contains(r#"name = "Pharmacie \"Centrale\"","#));
        assert!(out.contains(r#"address = "Rue 1\nKénitra","#));
        assert!(!out.contains("Rue 1\nKénitra"));
    }

    #[test]
    fn test_one_entry_per_record_and_single_helper_block() {
        let records: Vec<_> = (1..=3)
            .map(|i| record(&format!("p_{:04}", i), &format!("Pharmacie {}", i)))
            .collect();
        let out = render_kotlin(&records, &EmitterConfig::default(), generated_at());

        assert_eq!(out.matches("        Pharmacy(\n").count(), 3);
        assert_eq!(out.matches("        ),\n").count(), 2);
        assert_eq!(out.matches("fun getNearbyPharmacies").count(), 1);
        assert!(out.contains("val earthRadius = 6371.0"));
    }

    #[test]
    fn test_helpers_in_order() {
        let out = render_kotlin(&[], &EmitterConfig::default(), generated_at());
        let positions: Vec<usize> = [
            "fun getAllPharmacies(",
            "fun getPharmaciesByCity(city: String): List<Pharmacy> {",
            "fun getPharmacyById(",
            "fun searchPharmacies(",
            "fun getGeocodedPharmacies(",
            "fun getNearbyPharmacies(",
            "private fun calculateDistance(",
        ]
        .iter()
        .map(|helper| out.find(helper).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(out.contains("pharmacies.filter { it.city.equals(city, ignoreCase = true) }"));
    }

    #[test]
    fn test_empty_collection() {
        let out = render_kotlin(&[], &EmitterConfig::default(), generated_at());
        assert!(out.contains("    val pharmacies = listOf(\n    )\n"));
        assert!(out.contains(" * Geocoded: 0 (0.0%)\n"));
    }

    #[test]
    fn test_failed_record_renders_sentinel() {
        let mut entry = record("p_0001", "Pharmacie Fantome");
        entry.latitude = 0.0;
        entry.longitude = 0.0;
        entry.geocoded = false;
        entry.geocode_status = GeocodeStatus::ZeroResults;
        entry.rating = None;
        entry.review_count = None;
        let out = render_kotlin(&[entry], &EmitterConfig::default(), generated_at());
        assert!(out.contains("            latitude = 0.0,\n"));
        assert!(out.contains("            rating = 0.0f,\n"));
        assert!(out.contains("            geocoded = false\n"));
    }
}
