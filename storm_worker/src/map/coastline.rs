//! Coarse land outlines for the western Pacific around the Philippines.
//!
//! Each polygon is a closed ring of `(lon, lat)` vertices, traced by hand at
//! roughly a quarter degree. That is plenty for a region 37 degrees wide;
//! small islands below that size are left out. Polygons that run past the
//! map edge are clipped when drawn.

pub struct LandMass {
    pub name: &'static str,
    pub outline: &'static [(f64, f64)],
}

const LUZON: &[(f64, f64)] = &[
    (120.6, 18.5), (121.0, 18.6), (121.9, 18.3), (122.2, 18.5), (122.3, 17.3),
    (122.5, 16.3), (122.0, 15.8), (121.6, 15.9), (121.4, 15.3), (121.6, 14.6),
    (121.7, 14.1), (122.0, 13.9), (122.6, 14.3), (123.1, 13.9), (123.4, 14.0),
    (123.8, 13.6), (124.2, 13.5), (124.1, 13.0), (123.9, 12.6), (123.4, 13.0),
    (123.1, 13.4), (122.6, 13.2), (122.3, 13.6), (121.8, 13.9), (121.3, 13.6),
    (120.9, 13.8), (120.6, 14.2), (120.6, 14.7), (120.2, 14.8), (120.0, 15.3),
    (119.8, 16.0), (120.2, 16.1), (120.4, 16.6), (120.4, 17.5),
];

const MINDORO: &[(f64, f64)] = &[
    (120.3, 13.5), (121.2, 13.6), (121.5, 13.0), (121.3, 12.2), (120.9, 12.4),
    (120.4, 13.0),
];

const MASBATE: &[(f64, f64)] = &[
    (123.2, 12.4), (123.6, 12.3), (123.9, 12.2), (124.0, 11.9), (123.6, 11.9),
];

const SAMAR: &[(f64, f64)] = &[
    (124.3, 12.5), (125.0, 12.6), (125.5, 12.2), (125.7, 11.2), (125.2, 11.1),
    (124.8, 11.4), (124.3, 12.0),
];

const LEYTE: &[(f64, f64)] = &[
    (124.3, 11.6), (124.8, 11.3), (125.0, 10.8), (125.2, 10.2), (124.8, 10.1),
    (124.4, 10.6),
];

const PANAY: &[(f64, f64)] = &[
    (121.9, 11.9), (122.6, 11.6), (123.1, 11.2), (122.6, 10.7), (122.0, 10.5),
    (121.9, 11.2),
];

const NEGROS: &[(f64, f64)] = &[
    (122.9, 11.0), (123.5, 10.8), (123.2, 9.7), (123.1, 9.1), (122.6, 9.3),
    (122.4, 9.9),
];

const CEBU: &[(f64, f64)] = &[
    (123.9, 11.3), (124.1, 10.9), (123.9, 10.2), (123.4, 9.4), (123.3, 9.9),
    (123.8, 11.0),
];

const BOHOL: &[(f64, f64)] = &[
    (123.8, 10.1), (124.5, 10.1), (124.6, 9.7), (124.1, 9.6), (123.8, 9.8),
];

const PALAWAN: &[(f64, f64)] = &[
    (119.3, 11.4), (119.8, 10.6), (119.2, 10.0), (118.5, 9.3), (117.6, 8.5),
    (117.2, 8.3), (117.6, 9.0), (118.3, 9.9), (119.0, 10.9),
];

const MINDANAO: &[(f64, f64)] = &[
    (121.9, 7.0), (122.2, 7.5), (122.9, 7.8), (123.5, 7.9), (123.7, 8.5),
    (124.2, 8.2), (124.7, 8.9), (125.2, 9.0), (125.5, 9.8), (126.0, 9.3),
    (126.3, 8.6), (126.5, 7.6), (126.4, 6.9), (126.1, 6.3), (125.7, 7.1),
    (125.4, 6.0), (125.2, 5.6), (124.3, 6.1), (124.0, 6.9), (123.7, 7.3),
    (123.0, 7.5), (122.2, 6.9),
];

const TAIWAN: &[(f64, f64)] = &[
    (121.5, 25.3), (122.0, 25.0), (121.8, 24.2), (121.4, 23.0), (120.9, 22.0),
    (120.7, 22.3), (120.2, 23.0), (120.1, 23.7), (120.7, 24.6),
];

const HAINAN: &[(f64, f64)] = &[
    (109.6, 20.0), (110.7, 20.1), (111.0, 19.6), (110.5, 18.7), (109.5, 18.2),
    (108.7, 18.5), (108.6, 19.3),
];

const BORNEO: &[(f64, f64)] = &[
    (108.9, 0.0), (109.6, 1.9), (111.0, 1.6), (111.5, 2.4), (113.0, 3.2),
    (114.0, 4.6), (115.4, 5.3), (116.1, 6.1), (116.8, 7.0), (117.7, 6.4),
    (118.3, 5.8), (119.3, 5.3), (118.4, 4.9), (118.0, 4.3), (117.6, 3.0),
    (118.1, 2.0), (119.0, 1.0), (117.8, 0.0),
];

const SULAWESI: &[(f64, f64)] = &[
    (120.0, 0.0), (120.0, 0.5), (121.0, 1.2), (122.5, 1.0), (124.0, 0.9),
    (125.1, 1.6), (124.5, 0.4), (123.2, 0.3), (121.0, 0.4),
];

// Indochina and south China as one mass, closed off well outside the map
const MAINLAND: &[(f64, f64)] = &[
    (100.0, 10.5), (104.0, 10.5), (104.8, 9.8), (105.1, 8.6), (106.8, 10.4),
    (108.0, 10.7), (109.2, 11.6), (109.3, 12.7), (109.2, 13.8), (108.8, 15.3),
    (108.2, 16.1), (107.1, 17.0), (106.4, 18.0), (105.8, 19.0), (106.7, 20.7),
    (107.9, 21.5), (109.2, 21.5), (109.7, 21.0), (110.2, 20.3), (110.5, 21.2),
    (111.7, 21.6), (113.1, 22.3), (114.2, 22.3), (115.5, 22.8), (116.7, 23.3),
    (117.8, 24.3), (118.8, 25.0), (119.6, 26.0), (119.6, 30.0), (100.0, 30.0),
];

pub const LAND_MASSES: &[LandMass] = &[
    LandMass { name: "Luzon", outline: LUZON },
    LandMass { name: "Mindoro", outline: MINDORO },
    LandMass { name: "Masbate", outline: MASBATE },
    LandMass { name: "Samar", outline: SAMAR },
    LandMass { name: "Leyte", outline: LEYTE },
    LandMass { name: "Panay", outline: PANAY },
    LandMass { name: "Negros", outline: NEGROS },
    LandMass { name: "Cebu", outline: CEBU },
    LandMass { name: "Bohol", outline: BOHOL },
    LandMass { name: "Palawan", outline: PALAWAN },
    LandMass { name: "Mindanao", outline: MINDANAO },
    LandMass { name: "Taiwan", outline: TAIWAN },
    LandMass { name: "Hainan", outline: HAINAN },
    LandMass { name: "Borneo", outline: BORNEO },
    LandMass { name: "Sulawesi", outline: SULAWESI },
    LandMass { name: "Mainland", outline: MAINLAND },
];
