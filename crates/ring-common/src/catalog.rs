//! Cyclone identifier lists that steer the annotation pass.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Known medicanes: their labels are trusted as-is.
pub const DEFAULT_MEDICANES: [u32; 6] = [1328, 1461, 1542, 1575, 1622, 1702];

/// Cyclones whose centre lies over land.
pub const DEFAULT_OVER_LAND: [u32; 106] = [
    848, 849, 860, 864, 865, 868, 871, 873, 889, 900, 907, 926, 940, 943, 950, 951, 969, 981, 985,
    988, 992, 1001, 1018, 1023, 1025, 1030, 1033, 1034, 1041, 1043, 1060, 1064, 1072, 1089, 1094,
    1107, 1112, 1126, 1147, 1154, 1166, 1180, 1185, 1199, 1206, 1214, 1215, 1223, 1225, 1232,
    1257, 1262, 1264, 1273, 1274, 1276, 1306, 1308, 1317, 1318, 1322, 1327, 1341, 1365, 1392,
    1404, 1405, 1408, 1414, 1420, 1441, 1450, 1452, 1453, 1456, 1484, 1491, 1492, 1496, 1497,
    1533, 1535, 1562, 1563, 1568, 1569, 1570, 1583, 1595, 1596, 1603, 1605, 1608, 1612, 1614,
    1615, 1616, 1625, 1648, 1649, 1650, 1651, 1664, 1666, 1686, 1700,
];

/// Cyclones removed from the dataset altogether.
pub const DEFAULT_EXCLUDED: [u32; 5] = [1542, 1622, 1466, 1500, 1674];

/// Identifier lists, loadable from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub medicanes: BTreeSet<u32>,
    pub over_land: BTreeSet<u32>,
    pub excluded: BTreeSet<u32>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            medicanes: DEFAULT_MEDICANES.into_iter().collect(),
            over_land: DEFAULT_OVER_LAND.into_iter().collect(),
            excluded: DEFAULT_EXCLUDED.into_iter().collect(),
        }
    }
}

impl Catalog {
    /// A catalog with no listed cyclones.
    pub fn empty() -> Self {
        Self {
            medicanes: BTreeSet::new(),
            over_land: BTreeSet::new(),
            excluded: BTreeSet::new(),
        }
    }

    pub fn is_medicane(&self, cyclone_id: u32) -> bool {
        self.medicanes.contains(&cyclone_id)
    }

    /// Over land or explicitly excluded.
    pub fn is_blocked(&self, cyclone_id: u32) -> bool {
        self.over_land.contains(&cyclone_id) || self.excluded.contains(&cyclone_id)
    }
}
