use serde::{Deserialize, Serialize};

/// Catalog entry. Module names granted to licenses are expected to match
/// a product `name`, but the catalog is reference data only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Built-in catalog seeded at startup: (name, display name, description).
pub const DEFAULT_PRODUCTS: &[(&str, &str, &str)] = &[
    (
        "CALCULADORA",
        "Calculadora Fiscal",
        "Sistema de cálculo de impuestos RESICO",
    ),
    ("VISOR", "Visor CFDI", "Visualizador de facturas electrónicas"),
    ("CONTABILIDAD", "Módulo Contabilidad", "Sistema contable completo"),
    ("NOMINA", "Gestión de Nómina", "Administración de nómina y pagos"),
    ("FACTURACION", "Facturación Electrónica", "Emisión de CFDIs"),
];
