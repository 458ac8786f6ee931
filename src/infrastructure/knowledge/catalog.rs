//! Built-in domain knowledge table.

use std::collections::BTreeMap;

use crate::domain::{DocumentType, Domain, DomainProfile};

/// Weight given to a domain's anchor keywords.
pub const ANCHOR_WEIGHT: f64 = 2.0;

struct Seed {
    name: Domain,
    keywords: &'static [&'static str],
    anchors: &'static [&'static str],
    stakeholders: &'static [&'static str],
    compliance: &'static [&'static str],
    practices: &'static [&'static str],
    rules: &'static [&'static str],
    examples: &'static [&'static str],
    brd: (&'static str, &'static [&'static str]),
    frd: &'static str,
}

impl Seed {
    fn into_profile(self) -> DomainProfile {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let (brd_focus, brd_areas) = self.brd;

        let mut brd = format!(
            "## {} BRD Template\n\n{}\n\n### Key Areas\n",
            self.name.label(),
            brd_focus
        );
        for area in brd_areas {
            brd.push_str(&format!("- {area}\n"));
        }
        let frd = format!("## {} FRD Template\n\n{}\n", self.name.label(), self.frd);

        DomainProfile {
            name: self.name,
            keywords: owned(self.keywords),
            keyword_weights: self
                .anchors
                .iter()
                .map(|anchor| (anchor.to_string(), ANCHOR_WEIGHT))
                .collect(),
            stakeholders: owned(self.stakeholders),
            compliance_terms: owned(self.compliance),
            best_practices: owned(self.practices),
            validation_rules: owned(self.rules),
            examples: owned(self.examples),
            templates: BTreeMap::from([(DocumentType::Brd, brd), (DocumentType::Frd, frd)]),
        }
    }
}

/// Every built-in profile in canonical domain order.
pub fn builtin_profiles() -> Vec<DomainProfile> {
    seeds().into_iter().map(Seed::into_profile).collect()
}

fn seeds() -> Vec<Seed> {
    vec![
        Seed {
            name: Domain::Healthcare,
            keywords: &["patient", "medical", "clinical", "hipaa", "ehr", "diagnosis", "treatment", "prescription"],
            anchors: &["patient"],
            stakeholders: &["Patients", "Physicians", "Nurses", "Admin Staff", "IT Support", "Compliance Officers"],
            compliance: &["HIPAA", "FDA", "Joint Commission", "State Medical Boards"],
            practices: &[
                "Ensure patient data privacy and security at all levels",
                "Implement role-based access control for medical records",
                "Maintain complete audit trails for all patient interactions",
                "Comply with HIPAA regulations for data handling",
            ],
            rules: &[
                "All patient identifiers must be encrypted",
                "Medical data access requires proper authentication",
                "Clinical decisions must be traceable to authorized personnel",
                "Patient consent required for all data usage",
            ],
            examples: &[
                "Patient registration with HIPAA compliance",
                "Medical record access control",
                "Clinical decision support system",
            ],
            brd: (
                "Patient safety and compliance focus: patient data protection, clinical workflows and regulatory compliance.",
                &["Patient Registration & Demographics", "Medical Record Management", "Clinical Decision Support", "Privacy & Security Controls", "Regulatory Compliance"],
            ),
            frd: "Clinical workflow and data management requirements with emphasis on patient care and data integrity.",
        },
        Seed {
            name: Domain::Banking,
            keywords: &["account", "transaction", "payment", "compliance", "kyc", "aml", "fraud", "regulatory"],
            anchors: &["account"],
            stakeholders: &["Account Holders", "Branch Staff", "Compliance Officers", "Risk Managers", "IT Security"],
            compliance: &["PCI DSS", "SOX", "Basel III", "GDPR", "AML/KYC Regulations"],
            practices: &[
                "Implement multi-factor authentication for all transactions",
                "Maintain real-time fraud monitoring and detection",
                "Ensure regulatory compliance across all jurisdictions",
                "Implement strong encryption for all financial data",
            ],
            rules: &[
                "Transaction amounts must be validated against limits",
                "Account verification required before any operations",
                "All financial operations must be logged and auditable",
                "Real-time balance validation before transactions",
            ],
            examples: &[
                "Account opening with KYC verification",
                "Real-time transaction processing",
                "Fraud detection and prevention",
            ],
            brd: (
                "Financial services and risk management: financial operations, regulatory compliance and security requirements.",
                &["Account Management", "Transaction Processing", "Risk Management", "Regulatory Reporting", "Security & Fraud Prevention"],
            ),
            frd: "Transaction processing and security requirements for banking systems with a compliance focus.",
        },
        Seed {
            name: Domain::Ecommerce,
            keywords: &["product", "order", "cart", "checkout", "inventory", "customer", "shipping", "payment"],
            anchors: &["product"],
            stakeholders: &["Customers", "Store Managers", "Inventory Managers", "Customer Service", "IT Support"],
            compliance: &["PCI DSS", "GDPR", "Consumer Protection Laws", "Tax Regulations"],
            practices: &[
                "Optimize for mobile-first user experience",
                "Implement secure payment processing",
                "Ensure real-time inventory synchronization",
                "Provide comprehensive order tracking",
            ],
            rules: &[
                "Product availability must be validated before ordering",
                "Payment processing must be PCI compliant",
                "Order confirmation required before processing",
                "Customer authentication required for account actions",
            ],
            examples: &[
                "Product catalog management",
                "Shopping cart and checkout flow",
                "Order fulfillment process",
            ],
            brd: (
                "Customer experience and order management: customer journey, product management and order processing.",
                &["Product Catalog Management", "Shopping Cart & Checkout", "Order Processing", "Customer Management", "Payment Integration"],
            ),
            frd: "User experience and transaction processing requirements for customer-centric commerce platforms.",
        },
        Seed {
            name: Domain::Marketing,
            keywords: &["campaign", "segmentation", "automation", "analytics", "lead", "customer journey"],
            anchors: &["campaign"],
            stakeholders: &["Marketing Managers", "Campaign Specialists", "Data Analysts", "Content Creators"],
            compliance: &["GDPR", "CAN-SPAM", "CCPA", "Email Marketing Regulations"],
            practices: &[
                "Implement consent-based marketing communications",
                "Personalize customer experiences using data insights",
                "Track campaign performance and ROI metrics",
                "Maintain customer preference centers",
            ],
            rules: &[
                "Customer consent required for all communications",
                "Email addresses must be validated before sending",
                "Campaign performance metrics must be tracked",
                "Unsubscribe options required in all communications",
            ],
            examples: &[],
            brd: (
                "Campaign management and customer engagement: automation, analytics and customer journey optimization.",
                &["Campaign Management", "Customer Segmentation", "Marketing Automation", "Analytics & Reporting", "Lead Management"],
            ),
            frd: "Campaign execution and analytics requirements with a focus on personalization and performance.",
        },
        Seed {
            name: Domain::Insurance,
            keywords: &["policy", "claim", "premium", "underwriting", "risk", "coverage", "actuarial", "reinsurance"],
            anchors: &[],
            stakeholders: &["Policyholders", "Insurance Agents", "Underwriters", "Claims Adjusters", "Actuaries", "Compliance Officers"],
            compliance: &["NAIC Regulations", "Solvency II", "GDPR", "State Insurance Laws", "AML Requirements"],
            practices: &[
                "Implement automated underwriting for standard policies",
                "Ensure accurate risk assessment and pricing",
                "Streamline claims processing with digital workflows",
                "Maintain regulatory compliance across all jurisdictions",
            ],
            rules: &[
                "Policy terms must comply with regulatory requirements",
                "Claims must be processed within regulatory timeframes",
                "Premium calculations must be actuarially sound",
                "Customer data must be protected according to privacy laws",
            ],
            examples: &[],
            brd: (
                "Policy administration and claims processing: policy lifecycle, claims management and regulatory compliance.",
                &["Policy Administration", "Underwriting Process", "Claims Processing", "Premium Calculation", "Risk Assessment"],
            ),
            frd: "Policy servicing and claims workflow requirements with actuarial and regulatory controls.",
        },
        Seed {
            name: Domain::Education,
            keywords: &["student", "course", "curriculum", "assessment", "learning", "academic", "enrollment", "graduation"],
            anchors: &[],
            stakeholders: &["Students", "Faculty", "Administrators", "Parents", "Academic Advisors", "IT Support"],
            compliance: &["FERPA", "ADA", "Title IX", "COPPA", "State Education Regulations"],
            practices: &[
                "Implement accessible learning management systems",
                "Ensure student data privacy and security",
                "Provide comprehensive academic tracking and reporting",
                "Support diverse learning modalities and requirements",
            ],
            rules: &[
                "Student records must be kept confidential per FERPA",
                "Academic content must meet accreditation standards",
                "Assessment methods must be fair and unbiased",
                "Technology platforms must be ADA compliant",
            ],
            examples: &[],
            brd: (
                "Learning outcomes and student services: enrollment, curriculum delivery and academic records.",
                &["Student Enrollment", "Course & Curriculum Management", "Assessment & Grading", "Academic Records", "Accessibility"],
            ),
            frd: "Learning platform requirements covering course delivery, assessment and student record handling.",
        },
        Seed {
            name: Domain::Logistics,
            keywords: &["shipment", "warehouse", "inventory", "tracking", "supply chain", "delivery", "freight", "distribution"],
            anchors: &[],
            stakeholders: &["Shippers", "Receivers", "Warehouse Staff", "Drivers", "Logistics Coordinators", "Supply Chain Managers"],
            compliance: &["DOT Regulations", "Customs Requirements", "Environmental Regulations", "Safety Standards"],
            practices: &[
                "Implement real-time shipment tracking and visibility",
                "Optimize warehouse operations and inventory management",
                "Ensure compliance with transportation regulations",
                "Provide automated route optimization and planning",
            ],
            rules: &[
                "Shipments must comply with hazardous materials regulations",
                "Delivery confirmations must be captured and stored",
                "Inventory levels must be accurately tracked and reported",
                "Driver hours must comply with DOT regulations",
            ],
            examples: &[],
            brd: (
                "Supply chain visibility: shipment planning, warehousing and last-mile delivery.",
                &["Shipment Planning", "Warehouse Management", "Fleet & Route Management", "Delivery Tracking", "Regulatory Compliance"],
            ),
            frd: "Shipment, warehouse and delivery tracking requirements with transport compliance controls.",
        },
        Seed {
            name: Domain::Fintech,
            keywords: &["digital wallet", "blockchain", "cryptocurrency", "robo-advisor", "peer-to-peer", "neobank", "api", "fintech"],
            anchors: &[],
            stakeholders: &["App Users", "Financial Advisors", "Developers", "Product Managers", "Risk Managers", "Compliance Officers"],
            compliance: &["PCI DSS", "PSD2", "Open Banking", "KYC", "AML", "GDPR", "Financial Regulations"],
            practices: &[
                "Implement secure API-first architecture",
                "Ensure real-time transaction processing and monitoring",
                "Provide intuitive user experiences for financial services",
                "Maintain regulatory compliance in all jurisdictions",
            ],
            rules: &[
                "All financial transactions must be encrypted and secure",
                "User identity verification required for account opening",
                "Transaction limits must be enforced based on risk assessment",
                "Compliance reporting must be automated and accurate",
            ],
            examples: &[],
            brd: (
                "Digital financial services: API-first products, onboarding and real-time money movement.",
                &["Digital Onboarding", "Wallet & Payments", "Open Banking APIs", "Risk & Fraud Controls", "Regulatory Reporting"],
            ),
            frd: "API, wallet and onboarding requirements for digital financial products.",
        },
        Seed {
            name: Domain::MutualFunds,
            keywords: &["nav", "portfolio", "fund manager", "asset allocation", "benchmark", "expense ratio", "dividend", "redemption"],
            anchors: &[],
            stakeholders: &["Investors", "Fund Managers", "Portfolio Analysts", "Compliance Officers", "Registrar", "Distributors"],
            compliance: &["SEBI Regulations", "Mutual Fund Rules", "KYC Requirements", "NAV Calculation", "Portfolio Disclosure"],
            practices: &[
                "Implement automated NAV calculation and publishing",
                "Ensure accurate portfolio management and rebalancing",
                "Provide comprehensive investor reporting and statements",
                "Maintain regulatory compliance with fund operations",
            ],
            rules: &[
                "NAV calculations must be accurate and timely",
                "Portfolio allocations must comply with fund objectives",
                "Investor transactions must be processed within regulatory timeframes",
                "All fund disclosures must be complete and accurate",
            ],
            examples: &[],
            brd: (
                "Fund operations and investor services: NAV computation, portfolio management and disclosures.",
                &["NAV Calculation", "Portfolio Management", "Investor Transactions", "Statements & Reporting", "Regulatory Disclosure"],
            ),
            frd: "Fund accounting, investor servicing and disclosure requirements.",
        },
        Seed {
            name: Domain::Aif,
            keywords: &["alternative investment", "hedge fund", "private equity", "venture capital", "accredited investor", "qualified buyer", "fund structure"],
            anchors: &[],
            stakeholders: &["Accredited Investors", "Fund Managers", "Investment Analysts", "Risk Officers", "Compliance Teams", "Prime Brokers"],
            compliance: &["AIF Regulations", "Accredited Investor Rules", "Disclosure Requirements", "Risk Management", "Reporting Standards"],
            practices: &[
                "Implement sophisticated risk management and monitoring",
                "Ensure proper investor accreditation and suitability",
                "Provide detailed performance reporting and analytics",
                "Maintain strict regulatory compliance and governance",
            ],
            rules: &[
                "Investor accreditation must be verified before investment",
                "Risk metrics must be calculated and monitored continuously",
                "Performance reporting must be accurate and comprehensive",
                "Compliance documentation must be maintained and auditable",
            ],
            examples: &[],
            brd: (
                "Alternative fund administration: investor accreditation, capital calls and performance reporting.",
                &["Investor Onboarding & Accreditation", "Capital Calls & Distributions", "Risk Monitoring", "Performance Reporting", "Governance"],
            ),
            frd: "Fund administration, accreditation and reporting requirements for alternative investment vehicles.",
        },
        Seed {
            name: Domain::CardsPayment,
            keywords: &["credit card", "debit card", "payment processing", "merchant", "pos", "contactless", "tokenization", "chargeback"],
            anchors: &[],
            stakeholders: &["Cardholders", "Merchants", "Payment Processors", "Banks", "Card Networks", "Risk Analysts"],
            compliance: &["PCI DSS", "EMV Standards", "PSD2", "Card Network Rules", "Consumer Protection Laws", "AML"],
            practices: &[
                "Implement secure tokenization for card data protection",
                "Ensure real-time fraud detection and prevention",
                "Provide seamless payment experiences across channels",
                "Maintain PCI DSS compliance for all payment operations",
            ],
            rules: &[
                "Card data must be encrypted and tokenized",
                "Transaction authorization must be real-time",
                "Fraud scoring must be applied to all transactions",
                "Chargeback processes must be automated and tracked",
            ],
            examples: &[],
            brd: (
                "Card issuing and acquiring: authorization, settlement and dispute handling.",
                &["Card Issuance", "Authorization & Settlement", "Merchant Acquiring", "Fraud & Chargebacks", "Network Compliance"],
            ),
            frd: "Authorization, settlement and dispute requirements for card and payment processing.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_scored_domain_in_order() {
        let names: Vec<Domain> = builtin_profiles().iter().map(|p| p.name).collect();
        assert_eq!(names, Domain::SCORED.to_vec());
    }

    #[test]
    fn anchors_are_doubled() {
        let profiles = builtin_profiles();
        assert_eq!(profiles[0].weight("patient"), ANCHOR_WEIGHT);
        assert_eq!(profiles[0].weight("medical"), 1.0);
        assert!(profiles
            .iter()
            .all(|p| p.template(DocumentType::Brd).is_some()));
    }
}
