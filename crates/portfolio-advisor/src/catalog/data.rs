//! Built-in sectors, allocation templates and market outlook.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{DividendRange, Issuer, Profile, RiskLevel, Sector, SectorWeight, Ticker, Volatility};

use super::{MarketAnalysis, MarketConditions, SectorCalls};

use Issuer::{Ark, IShares, Invesco, Schwab, Spdr, Vanguard};

#[allow(clippy::too_many_arguments)]
fn sector(
    id: &str,
    name: &str,
    code: &str,
    description: &str,
    risk_level: RiskLevel,
    volatility: Volatility,
    dividend_yield: (Decimal, Decimal),
    tickers: Vec<Ticker>,
) -> Sector {
    Sector {
        id: id.into(),
        name: name.into(),
        code: code.into(),
        tickers,
        description: description.into(),
        risk_level,
        volatility,
        dividend_yield: DividendRange::new(dividend_yield.0, dividend_yield.1),
    }
}

/// The three-fund layout most sectors share: iShares, Vanguard, SPDR
fn sector_trio(ishares: (&str, &str), vanguard: (&str, &str), spdr: (&str, &str)) -> Vec<Ticker> {
    vec![
        Ticker::etf(ishares.0, ishares.1, dec!(0.42), IShares),
        Ticker::etf(vanguard.0, vanguard.1, dec!(0.10), Vanguard),
        Ticker::etf(spdr.0, spdr.1, dec!(0.10), Spdr),
    ]
}

pub fn sectors() -> Vec<Sector> {
    vec![
        sector(
            "bienes-raices",
            "Bienes Raíces",
            "REITs",
            "Sector inmobiliario incluyendo REITs, empresas de desarrollo y gestión inmobiliaria",
            RiskLevel::MediumHigh,
            Volatility::High,
            (dec!(3.5), dec!(5.0)),
            vec![
                Ticker::etf("IYR", "iShares U.S. Real Estate ETF", dec!(0.42), IShares),
                Ticker::etf("VNQ", "Vanguard Real Estate ETF", dec!(0.12), Vanguard),
                Ticker::etf("XLRE", "Real Estate Select Sector SPDR Fund", dec!(0.10), Spdr),
                Ticker::etf("REET", "iShares Global REIT ETF", dec!(0.14), IShares),
                Ticker::etf("SCHH", "Schwab US REIT ETF", dec!(0.07), Schwab),
            ],
        ),
        sector(
            "comunicaciones",
            "Comunicaciones",
            "COMM",
            "Servicios de comunicación, telecomunicaciones, medios y entretenimiento",
            RiskLevel::Medium,
            Volatility::Medium,
            (dec!(1.5), dec!(3.0)),
            sector_trio(
                ("IYZ", "iShares U.S. Telecommunications ETF"),
                ("VOX", "Vanguard Communication Services ETF"),
                ("XLC", "Communication Services Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "consumo-basico",
            "Consumo Básico",
            "STPL",
            "Productos de primera necesidad: alimentos, bebidas, productos del hogar",
            RiskLevel::Low,
            Volatility::Low,
            (dec!(2.5), dec!(3.5)),
            sector_trio(
                ("IYK", "iShares U.S. Consumer Staples ETF"),
                ("VDC", "Vanguard Consumer Staples ETF"),
                ("XLP", "Consumer Staples Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "consumo-discrecional",
            "Consumo Discrecional",
            "DISC",
            "Bienes y servicios no esenciales: retail, restaurantes, automóviles, lujo",
            RiskLevel::MediumHigh,
            Volatility::High,
            (dec!(1.0), dec!(2.5)),
            sector_trio(
                ("IYC", "iShares U.S. Consumer Discretionary ETF"),
                ("VCR", "Vanguard Consumer Discretionary ETF"),
                ("XLY", "Consumer Discretionary Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "energia",
            "Energía",
            "ENRG",
            "Petróleo, gas natural, energías renovables y servicios energéticos",
            RiskLevel::High,
            Volatility::VeryHigh,
            (dec!(4.0), dec!(6.0)),
            sector_trio(
                ("IYE", "iShares U.S. Energy ETF"),
                ("VDE", "Vanguard Energy ETF"),
                ("XLE", "Energy Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "finanzas",
            "Finanzas",
            "FINL",
            "Bancos, seguros, servicios financieros e inversiones",
            RiskLevel::MediumHigh,
            Volatility::High,
            (dec!(2.5), dec!(4.0)),
            sector_trio(
                ("IYF", "iShares U.S. Financials ETF"),
                ("VFH", "Vanguard Financials ETF"),
                ("XLF", "Financial Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "industria",
            "Industria",
            "INDL",
            "Manufacturing, transporte, construcción, maquinaria y defensa",
            RiskLevel::Medium,
            Volatility::MediumHigh,
            (dec!(1.8), dec!(2.8)),
            sector_trio(
                ("IYJ", "iShares U.S. Industrials ETF"),
                ("VIS", "Vanguard Industrials ETF"),
                ("XLI", "Industrial Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "materiales",
            "Materiales",
            "MATL",
            "Minería, químicos, metales, papel y materiales de construcción",
            RiskLevel::MediumHigh,
            Volatility::High,
            (dec!(2.0), dec!(3.0)),
            sector_trio(
                ("IYM", "iShares U.S. Basic Materials ETF"),
                ("VAW", "Vanguard Materials ETF"),
                ("XLB", "Materials Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "salud",
            "Salud",
            "HLTH",
            "Farmacéuticas, biotecnología, equipos médicos y servicios de salud",
            RiskLevel::Medium,
            Volatility::Medium,
            (dec!(1.5), dec!(2.5)),
            sector_trio(
                ("IYH", "iShares U.S. Healthcare ETF"),
                ("VHT", "Vanguard Health Care ETF"),
                ("XLV", "Health Care Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "servicios-basicos",
            "Servicios Básicos",
            "UTIL",
            "Electricidad, gas, agua y servicios públicos esenciales",
            RiskLevel::Low,
            Volatility::Low,
            (dec!(3.0), dec!(4.5)),
            sector_trio(
                ("IDU", "iShares U.S. Utilities ETF"),
                ("VPU", "Vanguard Utilities ETF"),
                ("XLU", "Utilities Select Sector SPDR Fund"),
            ),
        ),
        sector(
            "tecnologia",
            "Tecnología",
            "TECH",
            "Software, hardware, semiconductores, internet y servicios tecnológicos",
            RiskLevel::High,
            Volatility::VeryHigh,
            (dec!(0.5), dec!(1.5)),
            vec![
                Ticker::etf("IYW", "iShares U.S. Technology ETF", dec!(0.42), IShares),
                Ticker::etf("VGT", "Vanguard Information Technology ETF", dec!(0.10), Vanguard),
                Ticker::etf("XLK", "Technology Select Sector SPDR Fund", dec!(0.10), Spdr),
                Ticker::etf("QQQ", "Invesco QQQ Trust ETF", dec!(0.20), Invesco),
                Ticker::etf("ARKK", "ARK Innovation ETF", dec!(0.75), Ark),
            ],
        ),
        sector(
            "core-broad",
            "Mercado Total (Core)",
            "CORE",
            "ETFs diversificados que representan el mercado estadounidense completo",
            RiskLevel::Medium,
            Volatility::Medium,
            (dec!(1.2), dec!(1.8)),
            vec![
                Ticker::etf("SPY", "SPDR S&P 500 ETF Trust", dec!(0.09), Spdr),
                Ticker::etf("VOO", "Vanguard S&P 500 ETF", dec!(0.03), Vanguard),
                Ticker::etf("IVV", "iShares Core S&P 500 ETF", dec!(0.03), IShares).broad(),
                Ticker::etf("SPLG", "SPDR Portfolio S&P 500 ETF", dec!(0.02), Spdr),
                Ticker::etf("VTI", "Vanguard Total Stock Market ETF", dec!(0.03), Vanguard),
                Ticker::etf("ITOT", "iShares Core S&P Total U.S. Stock Market ETF", dec!(0.03), IShares)
                    .broad(),
            ],
        ),
        sector(
            "bonos",
            "Renta Fija",
            "BOND",
            "Bonos del gobierno y corporativos para estabilidad y ingresos",
            RiskLevel::Low,
            Volatility::Low,
            (dec!(3.0), dec!(4.5)),
            vec![
                Ticker::etf("AGG", "iShares Core U.S. Aggregate Bond ETF", dec!(0.03), IShares).broad(),
                Ticker::etf("BND", "Vanguard Total Bond Market ETF", dec!(0.03), Vanguard),
                Ticker::etf("TLT", "iShares 20+ Year Treasury Bond ETF", dec!(0.15), IShares),
                Ticker::etf("IEF", "iShares 7-10 Year Treasury Bond ETF", dec!(0.15), IShares),
                Ticker::etf("LQD", "iShares iBoxx Investment Grade Corporate Bond ETF", dec!(0.14), IShares),
            ],
        ),
    ]
}

fn profile(
    id: &str,
    name: &str,
    description: &str,
    risk_tolerance: RiskLevel,
    time_horizon: &str,
    weights: &[(&str, Decimal)],
    characteristics: [&str; 3],
) -> Profile {
    Profile {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        risk_tolerance,
        time_horizon: time_horizon.into(),
        allocation: weights
            .iter()
            .map(|(sector_id, percentage)| SectorWeight {
                sector_id: (*sector_id).to_string(),
                percentage: *percentage,
            })
            .collect(),
        characteristics: characteristics.iter().map(ToString::to_string).collect(),
    }
}

pub fn profiles() -> Vec<Profile> {
    vec![
        profile(
            "conservative",
            "Conservador",
            "Enfoque en preservación de capital con crecimiento estable",
            RiskLevel::Low,
            "1-3 años",
            &[
                ("bonos", dec!(70)),
                ("core-broad", dec!(20)),
                ("servicios-basicos", dec!(5)),
                ("consumo-basico", dec!(5)),
            ],
            ["Baja volatilidad", "Ingresos regulares", "Preservación capital"],
        ),
        profile(
            "balanced",
            "Balanceado",
            "Equilibrio entre crecimiento y estabilidad",
            RiskLevel::Medium,
            "3-7 años",
            &[
                ("bonos", dec!(40)),
                ("core-broad", dec!(35)),
                ("tecnologia", dec!(8)),
                ("salud", dec!(7)),
                ("finanzas", dec!(5)),
                ("consumo-basico", dec!(5)),
            ],
            ["Diversificación sectorial", "Crecimiento moderado", "Volatilidad controlada"],
        ),
        profile(
            "growth",
            "Crecimiento",
            "Enfoque en crecimiento a largo plazo",
            RiskLevel::MediumHigh,
            "5-10 años",
            &[
                ("bonos", dec!(20)),
                ("core-broad", dec!(30)),
                ("tecnologia", dec!(20)),
                ("consumo-discrecional", dec!(10)),
                ("salud", dec!(10)),
                ("finanzas", dec!(5)),
                ("industria", dec!(5)),
            ],
            ["Alto potencial crecimiento", "Volatilidad moderada-alta", "Diversificación sectorial"],
        ),
        profile(
            "aggressive",
            "Agresivo",
            "Máximo potencial de crecimiento con alta volatilidad",
            RiskLevel::High,
            "7-15+ años",
            &[
                ("bonos", dec!(5)),
                ("core-broad", dec!(25)),
                ("tecnologia", dec!(30)),
                ("consumo-discrecional", dec!(15)),
                ("finanzas", dec!(10)),
                ("industria", dec!(8)),
                ("materiales", dec!(4)),
                ("energia", dec!(3)),
            ],
            ["Máximo potencial crecimiento", "Alta volatilidad", "Concentración en crecimiento"],
        ),
        profile(
            "sector-rotation",
            "Rotación Sectorial",
            "Estrategia activa basada en ciclos económicos",
            RiskLevel::High,
            "3-7 años",
            &[
                ("bonos", dec!(10)),
                ("core-broad", dec!(20)),
                ("tecnologia", dec!(15)),
                ("finanzas", dec!(15)),
                ("industria", dec!(12)),
                ("energia", dec!(10)),
                ("materiales", dec!(8)),
                ("consumo-discrecional", dec!(10)),
            ],
            ["Estrategia activa", "Exposición cíclica", "Requiere monitoreo"],
        ),
        profile(
            "dividend-income",
            "Ingresos por Dividendos",
            "Enfoque en generación de ingresos regulares",
            RiskLevel::Medium,
            "3-10 años",
            &[
                ("bonos", dec!(30)),
                ("core-broad", dec!(20)),
                ("servicios-basicos", dec!(15)),
                ("consumo-basico", dec!(12)),
                ("finanzas", dec!(10)),
                ("bienes-raices", dec!(8)),
                ("energia", dec!(5)),
            ],
            ["Alto rendimiento dividendos", "Ingresos regulares", "Menor volatilidad"],
        ),
    ]
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

pub fn market_analysis() -> MarketAnalysis {
    MarketAnalysis {
        conditions: MarketConditions {
            market_phase: "Expansión".into(),
            interest_rate_environment: "Neutral".into(),
            inflation_trend: "Moderada".into(),
            economic_cycle: "Mid-Cycle".into(),
        },
        recommendations: SectorCalls {
            overweight: ids(&["tecnologia", "finanzas", "industria"]),
            neutral: ids(&["core-broad", "salud", "consumo-discrecional"]),
            underweight: ids(&["energia", "materiales", "servicios-basicos"]),
        },
        rationale: [
            ("tecnologia", "Beneficiado por innovación continua y digitalización"),
            ("finanzas", "Favorable por tasas de interés neutrales"),
            ("industria", "Crecimiento económico sostenido impulsa demanda"),
            ("energia", "Volatilidad de precios commodities"),
            ("materiales", "Sensible a ciclos económicos"),
            ("servicios-basicos", "Menor atractivo en entorno de crecimiento"),
        ]
        .into_iter()
        .map(|(id, text)| (id.to_string(), text.to_string()))
        .collect(),
    }
}
