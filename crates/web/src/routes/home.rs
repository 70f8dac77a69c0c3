//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;

/// A feature card on the landing page.
pub struct Feature {
    pub icon: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub href: &'static str,
}

/// Marketing copy for the feature grid.
pub const FEATURES: &[Feature] = &[
    Feature {
        icon: "box",
        title: "Inventaris Real-time",
        body: "Catat stok, harga, dan kategori produk. Perubahan langsung terlihat di semua perangkat.",
        href: "/inventory",
    },
    Feature {
        icon: "cart",
        title: "Kasir (POS)",
        body: "Hitung belanja pelanggan, pilih metode bayar, dan stok berkurang otomatis.",
        href: "/transaction",
    },
    Feature {
        icon: "chart",
        title: "Riwayat Penjualan",
        body: "Cari transaksi per status atau nama pelanggan, dan impor data penjualan lama.",
        href: "/sales",
    },
    Feature {
        icon: "chat",
        title: "Asisten AI",
        body: "Tanya strategi promosi, harga, atau stok. Asisten mengingat percakapan sebelumnya.",
        href: "/chat",
    },
    Feature {
        icon: "image",
        title: "Studio Konten",
        body: "Unggah foto produk, dapatkan desain promosi dan caption siap posting.",
        href: "/studio",
    },
    Feature {
        icon: "spark",
        title: "Insight Bisnis",
        body: "Ringkasan penjualan dan rekomendasi restok yang disusun dari data tokomu sendiri.",
        href: "/dashboard",
    },
];

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub features: &'static [Feature],
}

/// Display the landing page.
pub async fn home(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        user,
        features: FEATURES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_link_to_dashboard_pages() {
        assert_eq!(FEATURES.len(), 6);
        for feature in FEATURES {
            assert!(feature.href.starts_with('/'));
            assert!(!feature.body.is_empty());
        }
    }

    #[test]
    fn test_home_renders_for_visitor() {
        let html = HomeTemplate {
            user: None,
            features: FEATURES,
        }
        .render()
        .expect("render");
        assert!(html.contains("Asisten AI"));
        assert!(html.contains("/auth/register"));
    }
}
